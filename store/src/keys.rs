//! Composite binary keys shared by every backend.
//!
//! Keys start with the proposal token followed by a NUL separator so that a
//! prefix scan on `token ++ 0x00` yields exactly one proposal's rows. Numeric
//! components are big-endian so that lexicographic order is numeric order.

use govcache_types::Token;

const SEP: u8 = 0;

/// `token ++ 0x00`: prefix of every row belonging to one proposal.
pub fn token_prefix(token: &Token) -> Vec<u8> {
    let mut key = Vec::with_capacity(token.as_str().len() + 1);
    key.extend_from_slice(token.as_str().as_bytes());
    key.push(SEP);
    key
}

/// `token ++ 0x00 ++ version_be`.
pub fn versioned(token: &Token, version: u64) -> Vec<u8> {
    let mut key = token_prefix(token);
    key.extend_from_slice(&version.to_be_bytes());
    key
}

/// `token ++ 0x00 ++ name`: comment, cast vote and option keys.
pub fn named(token: &Token, name: &str) -> Vec<u8> {
    let mut key = token_prefix(token);
    key.extend_from_slice(name.as_bytes());
    key
}

/// `token ++ 0x00 ++ comment_id ++ 0x00`: prefix of one comment's likes.
pub fn comment_like_prefix(token: &Token, comment_id: &str) -> Vec<u8> {
    let mut key = named(token, comment_id);
    key.push(SEP);
    key
}

/// `token ++ 0x00 ++ comment_id ++ 0x00 ++ seq_be`.
pub fn comment_like(token: &Token, comment_id: &str, seq: u64) -> Vec<u8> {
    let mut key = comment_like_prefix(token, comment_id);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// `token ++ 0x00 ++ vote_bit ++ 0x00`: prefix of the tally index for one
/// option.
pub fn vote_bit_prefix(token: &Token, vote_bit: &str) -> Vec<u8> {
    let mut key = named(token, vote_bit);
    key.push(SEP);
    key
}

/// `token ++ 0x00 ++ vote_bit ++ 0x00 ++ ticket`: tally index entry.
pub fn vote_bit_ticket(token: &Token, vote_bit: &str, ticket: &str) -> Vec<u8> {
    let mut key = vote_bit_prefix(token, vote_bit);
    key.extend_from_slice(ticket.as_bytes());
    key
}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (the prefix is all `0xff`).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_prefix_isolates_tokens() {
        let a = named(&Token::new("ab"), "1");
        let b = named(&Token::new("abc"), "1");
        assert!(a.starts_with(&token_prefix(&Token::new("ab"))));
        assert!(!b.starts_with(&token_prefix(&Token::new("ab"))));
    }

    #[test]
    fn versions_sort_numerically() {
        let t = Token::new("t");
        assert!(versioned(&t, 2) < versioned(&t, 10));
        assert!(versioned(&t, 255) < versioned(&t, 256));
    }

    #[test]
    fn likes_keep_append_order() {
        let t = Token::new("t");
        assert!(comment_like(&t, "1", 9) < comment_like(&t, "1", 10));
        assert!(comment_like(&t, "1", 10).starts_with(&comment_like_prefix(&t, "1")));
        assert!(!comment_like(&t, "10", 0).starts_with(&comment_like_prefix(&t, "1")));
    }

    #[test]
    fn prefix_end_bounds_prefix() {
        assert_eq!(prefix_end(b"ab\0"), Some(b"ab\x01".to_vec()));
        assert_eq!(prefix_end(&[0x01, 0xff]), Some(vec![0x02]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
    }
}
