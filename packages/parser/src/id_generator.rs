use crc32fast::Hasher;

/// Generate a reproducible uniqueness token from an element hash.
///
/// Used for the stable move-key attribute: the same source location always
/// yields the same token, and two siblings can never collide because their
/// element hashes differ.
pub fn get_element_token(element_hash: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(element_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_token_is_reproducible() {
        let a = get_element_token("/page.tsx:4:2");
        let b = get_element_token("/page.tsx:4:2");
        let c = get_element_token("/page.tsx:9:2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
