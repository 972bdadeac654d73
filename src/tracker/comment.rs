use std::{fmt::Display, ops::Deref, sync::LazyLock};

use anyhow::Result;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::console::Prompter;

pub const MAX_COMMENT_LENGTH: usize = 40;

pub const COMMENT_QUESTION: &str = "What comment do you want to save?";

static COMMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z\s]*$").expect("comment pattern is invalid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("A comment can only contain letters and spaces")]
    InvalidCharacters,
    #[error("A comment can have at most {MAX_COMMENT_LENGTH} characters")]
    TooLong,
}

/// Free text attached to a finished session. Only letters and whitespace, capped at
/// [MAX_COMMENT_LENGTH] characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment(String);

impl Comment {
    pub fn parse(value: &str) -> Result<Self, CommentError> {
        if !COMMENT_PATTERN.is_match(value) {
            return Err(CommentError::InvalidCharacters);
        }
        if value.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CommentError::TooLong);
        }
        Ok(Self(value.to_string()))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Comment {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asks for a comment until the answer is valid. Cancelling or answering with nothing but
/// whitespace yields an empty comment, any other answer is kept as typed.
pub async fn capture_comment(prompter: &mut dyn Prompter) -> Result<Comment> {
    loop {
        let Some(answer) = prompter.ask(COMMENT_QUESTION).await? else {
            return Ok(Comment::empty());
        };
        if answer.trim().is_empty() {
            return Ok(Comment::empty());
        }
        match Comment::parse(&answer) {
            Ok(comment) => return Ok(comment),
            Err(e) => {
                debug!("Rejected comment {answer:?}: {e}");
                prompter.alert(&format!(
                    "{e}. Comments may only contain letters and spaces, up to {MAX_COMMENT_LENGTH} characters."
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use mockall::Sequence;

    use crate::console::MockPrompter;

    use super::{capture_comment, Comment, CommentError};

    #[test]
    fn test_comment_validation() {
        assert_eq!(Comment::parse("abc123"), Err(CommentError::InvalidCharacters));
        assert_eq!(Comment::parse(&"a".repeat(41)), Err(CommentError::TooLong));
        assert_eq!(&*Comment::parse(&"a".repeat(40)).unwrap(), "a".repeat(40));
        assert_eq!(&*Comment::parse("hello world").unwrap(), "hello world");
        assert_eq!(Comment::parse("").unwrap(), Comment::empty());
        assert_eq!(Comment::parse("tabs\tand\nlines").unwrap().len(), 14);
        assert_eq!(Comment::parse("done!"), Err(CommentError::InvalidCharacters));
    }

    #[tokio::test]
    async fn test_capture_reprompts_until_valid() -> Result<()> {
        let mut prompter = MockPrompter::new();
        let mut sequence = Sequence::new();
        prompter
            .expect_ask()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(Some("abc123".into())));
        prompter
            .expect_alert()
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(());
        prompter
            .expect_ask()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(Some("x".repeat(41))));
        prompter
            .expect_alert()
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(());
        prompter
            .expect_ask()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(Some("fixed the parser".into())));

        let comment = capture_comment(&mut prompter).await?;
        assert_eq!(&*comment, "fixed the parser");
        Ok(())
    }

    #[tokio::test]
    async fn test_capture_accepts_cancel_as_empty() -> Result<()> {
        let mut prompter = MockPrompter::new();
        prompter.expect_ask().times(1).returning(|_| Ok(None));
        prompter.expect_alert().never();

        assert_eq!(capture_comment(&mut prompter).await?, Comment::empty());

        let mut prompter = MockPrompter::new();
        prompter
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some("   ".into())));
        assert_eq!(capture_comment(&mut prompter).await?, Comment::empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_capture_keeps_surrounding_spaces() -> Result<()> {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some("  pair programming ".into())));
        prompter.expect_alert().never();

        let comment = capture_comment(&mut prompter).await?;
        assert_eq!(&*comment, "  pair programming ");
        Ok(())
    }
}
