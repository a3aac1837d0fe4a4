//! Event title splitting
//!
//! Titles on the contest page carry a parenthetical subtitle, written with
//! either full-width or ASCII brackets: `台北馬拉松（精英組）`.

/// Full-width and ASCII opening brackets, in precedence order
const OPEN_BRACKETS: [char; 2] = ['（', '('];

/// Full-width and ASCII closing brackets, in precedence order
const CLOSE_BRACKETS: [char; 2] = ['）', ')'];

/// A title split into its primary name and parenthetical info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTitle {
    pub name: String,
    pub info: Option<String>,
}

/// Split a title into name and parenthetical info
///
/// The full-width opening bracket wins when both kinds occur. The closing
/// bracket is searched after the opening one, again full-width first; no
/// nesting is balanced. Without an opening bracket the title is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use racecal::parser::title::split_title;
///
/// let split = split_title("台北馬拉松（精英組）");
/// assert_eq!(split.name, "台北馬拉松");
/// assert_eq!(split.info.as_deref(), Some("精英組"));
/// ```
pub fn split_title(title: &str) -> SplitTitle {
    let Some(open_at) = find_first_kind(title, &OPEN_BRACKETS) else {
        return SplitTitle {
            name: title.to_string(),
            info: None,
        };
    };

    let open_len = title[open_at..].chars().next().map_or(1, char::len_utf8);
    let rest = &title[open_at + open_len..];

    let info = match find_first_kind(rest, &CLOSE_BRACKETS) {
        Some(close_at) => &rest[..close_at],
        None => rest,
    };

    SplitTitle {
        name: title[..open_at].trim_end().to_string(),
        info: Some(info.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

/// Byte offset of the first bracket of the highest-precedence kind present
fn find_first_kind(text: &str, kinds: &[char]) -> Option<usize> {
    kinds.iter().find_map(|bracket| text.find(*bracket))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_brackets() {
        let split = split_title("台北馬拉松（精英組）");
        assert_eq!(split.name, "台北馬拉松");
        assert_eq!(split.info, Some("精英組".to_string()));
    }

    #[test]
    fn test_ascii_brackets() {
        let split = split_title("Taipei Run (Night)");
        assert_eq!(split.name, "Taipei Run");
        assert_eq!(split.info, Some("Night".to_string()));
    }

    #[test]
    fn test_no_brackets_unchanged() {
        let split = split_title("田中馬拉松");
        assert_eq!(split.name, "田中馬拉松");
        assert!(split.info.is_none());
    }

    #[test]
    fn test_full_width_takes_precedence() {
        // ASCII bracket appears first but the full-width pair is used
        let split = split_title("2024(第5屆)路跑（半馬）");
        assert_eq!(split.name, "2024(第5屆)路跑");
        assert_eq!(split.info, Some("半馬".to_string()));
    }

    #[test]
    fn test_mixed_pair() {
        let split = split_title("金門馬拉松（全程)");
        assert_eq!(split.name, "金門馬拉松");
        assert_eq!(split.info, Some("全程".to_string()));
    }

    #[test]
    fn test_unclosed_bracket_runs_to_end() {
        let split = split_title("太魯閣馬拉松（延期");
        assert_eq!(split.name, "太魯閣馬拉松");
        assert_eq!(split.info, Some("延期".to_string()));
    }

    #[test]
    fn test_single_level_only() {
        let split = split_title("路跑（A（B）C）");
        assert_eq!(split.name, "路跑");
        assert_eq!(split.info, Some("A（B".to_string()));
    }

    #[test]
    fn test_empty_info_is_absent() {
        let split = split_title("路跑（）");
        assert_eq!(split.name, "路跑");
        assert!(split.info.is_none());
    }

    #[test]
    fn test_closing_bracket_before_opening_is_ignored() {
        let split = split_title("五)月路跑（親子組）");
        assert_eq!(split.name, "五)月路跑");
        assert_eq!(split.info, Some("親子組".to_string()));
    }

    #[test]
    fn test_name_and_info_whitespace_trimmed() {
        let split = split_title("山城路跑 ( 10K組 )");
        assert_eq!(split.name, "山城路跑");
        assert_eq!(split.info, Some("10K組".to_string()));

        assert!(split_title("路跑（  ）").info.is_none());
    }
}
