//! Hierarchical logger names.

/// Separator between the segments of a logger name.
pub const SEPARATOR: char = '.';

/// Name of the logger configuration used when no ancestor matches.
pub const ROOT_LOGGER: &str = "Root";

/// Iterate over the candidates for configuring `identifier`, most specific first.
///
/// Each step cuts the name at its last separator. The reserved root name is
/// not part of the lineage; resolvers fall back to it explicitly.
///
/// # Example
///
/// ```
/// use rotalog_types::lineage;
///
/// let names: Vec<&str> = lineage("App.Module.Class").collect();
/// assert_eq!(names, vec!["App.Module.Class", "App.Module", "App"]);
/// ```
pub fn lineage(identifier: &str) -> Lineage<'_> {
    Lineage {
        next: Some(identifier),
    }
}

/// Iterator returned by [`lineage`].
#[derive(Debug, Clone)]
pub struct Lineage<'a> {
    next: Option<&'a str>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let current = self.next?;
        self.next = current.rfind(SEPARATOR).map(|idx| &current[..idx]);
        Some(current)
    }
}

/// Identifier of a destination: the owning logger's name and the appender's name.
pub fn destination_id(logger: &str, appender: &str) -> String {
    format!("{}{}{}", logger, SEPARATOR, appender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage_single_segment() {
        let names: Vec<&str> = lineage("App").collect();
        assert_eq!(names, vec!["App"]);
    }

    #[test]
    fn test_lineage_deep_name() {
        let names: Vec<&str> = lineage("App.Module.Sub.Class").collect();
        assert_eq!(names, vec!["App.Module.Sub.Class", "App.Module.Sub", "App.Module", "App"]);
    }

    #[test]
    fn test_lineage_empty_segments() {
        let names: Vec<&str> = lineage("App..Class").collect();
        assert_eq!(names, vec!["App..Class", "App.", "App"]);

        let names: Vec<&str> = lineage("").collect();
        assert_eq!(names, vec![""]);
    }

    #[test]
    fn test_destination_id() {
        assert_eq!(destination_id("App.Module", "RollAppender"), "App.Module.RollAppender");
    }
}
