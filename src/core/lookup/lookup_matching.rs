// Fuzzy lookup of users, roles and channels from what someone typed:
// a mention (`<@!123>`, `<@&123>`, `<#123>`), a raw id, or part of a name.

/// Characters that wrap ids in Discord mentions.
const MENTION_CHARS: &[char] = &['\\', '<', '>', '@', '!', '&', '#'];

/// Pull the snowflake out of a mention or raw id.
pub fn parse_snowflake(value: &str) -> Option<u64> {
    let stripped: String = value
        .trim()
        .chars()
        .filter(|c| !MENTION_CHARS.contains(c))
        .collect();
    stripped.parse().ok().filter(|id| *id != 0)
}

/// Pick the item a query refers to.
///
/// An exact id match wins. Then an item with a name equal to the query,
/// then one with a name containing it (both case-insensitive). Among several
/// name matches the lowest id is returned, so the result never depends on
/// the order `items` come in.
pub fn find_best_match<T, I, F, N>(items: I, query: &str, id_of: F, names_of: N) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> u64,
    N: Fn(&T) -> Vec<String>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let items: Vec<T> = items.into_iter().collect();

    if let Some(id) = parse_snowflake(&query) {
        if let Some(position) = items.iter().position(|item| id_of(item) == id) {
            return items.into_iter().nth(position);
        }
    }

    let lowest_id_where = |matches: &dyn Fn(&str) -> bool| {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| names_of(item).iter().any(|name| matches(&name.to_lowercase())))
            .min_by_key(|(_, item)| id_of(item))
            .map(|(position, _)| position)
    };

    let position = lowest_id_where(&|name| name == query)
        .or_else(|| lowest_id_where(&|name| name.contains(query.as_str())))?;
    items.into_iter().nth(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Member {
        id: u64,
        nick: &'static str,
        username: &'static str,
    }

    fn members() -> Vec<Member> {
        vec![
            Member {
                id: 111,
                nick: "Ferris",
                username: "crab",
            },
            Member {
                id: 222,
                nick: "Corro",
                username: "unsafe_crab",
            },
        ]
    }

    fn lookup(query: &str) -> Option<u64> {
        find_best_match(
            members(),
            query,
            |m| m.id,
            |m| vec![m.nick.to_string(), m.username.to_string()],
        )
        .map(|m| m.id)
    }

    #[test]
    fn parses_mentions_and_raw_ids() {
        assert_eq!(parse_snowflake("<@!123>"), Some(123));
        assert_eq!(parse_snowflake("<@&456>"), Some(456));
        assert_eq!(parse_snowflake("<#789>"), Some(789));
        assert_eq!(parse_snowflake(" 42 "), Some(42));
        assert_eq!(parse_snowflake("ferris"), None);
        assert_eq!(parse_snowflake("<@0>"), None);
    }

    #[test]
    fn id_match_beats_name_match() {
        assert_eq!(lookup("<@222>"), Some(222));
        assert_eq!(lookup("111"), Some(111));
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        assert_eq!(lookup("FERR"), Some(111));
        assert_eq!(lookup("unsafe"), Some(222));
    }

    #[test]
    fn ambiguous_names_resolve_the_same_in_any_order() {
        let mut reversed = members();
        reversed.reverse();
        let lookup_reversed = |query: &str| {
            find_best_match(
                reversed.clone(),
                query,
                |m| m.id,
                |m| vec![m.nick.to_string(), m.username.to_string()],
            )
            .map(|m| m.id)
        };

        // "crab" is an exact username of 111 and a substring of 222's.
        assert_eq!(lookup("crab"), Some(111));
        assert_eq!(lookup_reversed("crab"), Some(111));
        // "r" is only ever a substring; the lowest id wins.
        assert_eq!(lookup("r"), Some(111));
        assert_eq!(lookup_reversed("r"), Some(111));
    }

    #[test]
    fn exact_name_beats_lower_id_substring() {
        let items = vec![(1_u64, "mods-team"), (2_u64, "mods")];
        let found = find_best_match(items, "Mods", |(id, _)| *id, |(_, name)| vec![name.to_string()]);
        assert_eq!(found, Some((2, "mods")));
    }

    #[test]
    fn no_match() {
        assert_eq!(lookup("gopher"), None);
        assert_eq!(lookup("   "), None);
        assert_eq!(lookup("<@999>"), None);
    }
}
