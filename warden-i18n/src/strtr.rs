//! Placeholder substitution

/// Replace every occurrence of each key with its value in a single pass.
///
/// At each position the longest matching key wins, so `:param10` is never
/// read as `:param1` followed by `0`. Replaced text is not scanned again.
///
/// ```
/// use warden_i18n::strtr;
///
/// let pairs = vec![
///     (":field".to_string(), "Password".to_string()),
///     (":param1".to_string(), "6".to_string()),
/// ];
/// assert_eq!(
///     strtr(":field must be at least :param1 long", &pairs),
///     "Password must be at least 6 long"
/// );
/// ```
pub fn strtr(template: &str, pairs: &[(String, String)]) -> String {
    let mut keys: Vec<&(String, String)> = pairs.iter().filter(|(k, _)| !k.is_empty()).collect();
    if keys.is_empty() {
        return template.to_string();
    }
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(c) = rest.chars().next() {
        for (key, value) in &keys {
            if rest.starts_with(key.as_str()) {
                out.push_str(value);
                rest = &rest[key.len()..];
                continue 'scan;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_pairs_returns_template() {
        assert_eq!(strtr("hello :name", &[]), "hello :name");
    }

    #[test]
    fn test_longest_key_wins() {
        let p = pairs(&[(":param1", "one"), (":param10", "ten")]);
        assert_eq!(strtr(":param10 and :param1", &p), "ten and one");
    }

    #[test]
    fn test_replacements_are_not_rescanned() {
        let p = pairs(&[(":a", ":b"), (":b", "x")]);
        assert_eq!(strtr(":a :b", &p), ":b x");
    }

    #[test]
    fn test_multibyte_text() {
        let p = pairs(&[(":field", "用户名")]);
        assert_eq!(strtr(":field不能为空", &p), "用户名不能为空");
    }
}
