//! Client side of the blog: API calls, navigation and view helpers.
mod api;
mod likes;
mod pages;
mod router;

pub use api::*;
pub use likes::*;
pub use pages::*;
pub use router::*;

const SNIPPET_WORDS: usize = 20;

/// First words of `content`, for post cards.
pub fn snippet(content: &str) -> String {
    let words = content.split(' ').collect::<Vec<_>>();
    if words.len() <= SNIPPET_WORDS {
        return content.to_owned();
    }

    format!("{}...", words[..SNIPPET_WORDS].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet() {
        assert_eq!(snippet(""), "");
        assert_eq!(snippet("short post"), "short post");

        let long = (1..=25).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let expected =
            (1..=20).map(|n| n.to_string()).collect::<Vec<_>>().join(" ") + "...";
        assert_eq!(snippet(&long), expected);
    }
}
