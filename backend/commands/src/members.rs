//! Member search and front set arithmetic.

use clove_front::{Fronters, Member};

/// Matches listed when a query is ambiguous.
pub const MAX_LISTED: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub enum MemberMatch<'a> {
    /// Exact name match, or the only partial match.
    Found(&'a Member),
    /// Several partial matches; every match is kept, listings cap at [`MAX_LISTED`].
    Ambiguous(Vec<&'a Member>),
    NotFound,
}

fn exact(member: &Member, query: &str) -> bool {
    member.label().to_lowercase() == query || member.name.to_lowercase() == query
}

fn partial(member: &Member, query: &str) -> bool {
    member.label().to_lowercase().contains(query) || member.name.to_lowercase().contains(query)
}

/// Case-insensitive search over label and name. An exact match beats any
/// number of partial matches. The query is taken as typed, whitespace included.
pub fn resolve_member<'a>(query: &str, candidates: &'a [Member]) -> MemberMatch<'a> {
    let query = query.to_lowercase();

    if let Some(found) = candidates.iter().find(|m| exact(m, &query)) {
        return MemberMatch::Found(found);
    }

    let mut matches: Vec<&Member> = candidates.iter().filter(|m| partial(m, &query)).collect();
    match matches.len() {
        0 => MemberMatch::NotFound,
        1 => MemberMatch::Found(matches.remove(0)),
        _ => MemberMatch::Ambiguous(matches),
    }
}

/// Bulleted list of labels, at most `limit` long.
pub fn bullet_list<'a>(members: impl IntoIterator<Item = &'a Member>, limit: usize) -> String {
    members
        .into_iter()
        .take(limit)
        .map(|m| format!("• {}", m.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Current fronters for an embed field; "None" when nobody is fronting.
pub fn fronter_field(members: &[Member]) -> String {
    if members.is_empty() {
        "None".to_string()
    } else {
        bullet_list(members, usize::MAX)
    }
}

/// Full id set with `member_id` added at the end.
pub fn with_member(current: &Fronters, member_id: &str) -> Vec<String> {
    let mut ids = current.ids();
    if !ids.iter().any(|id| id == member_id) {
        ids.push(member_id.to_string());
    }
    ids
}

/// Full id set with `member_id` taken out.
pub fn without_member(current: &Fronters, member_id: &str) -> Vec<String> {
    current.ids().into_iter().filter(|id| id != member_id).collect()
}
