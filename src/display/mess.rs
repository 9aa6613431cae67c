//! Mess and member display formatting

use std::collections::HashMap;

use crate::models::{Member, MemberId, Mess};

use super::fit;

/// Format a list of messes
pub fn format_mess_list(messes: &[Mess]) -> String {
    if messes.is_empty() {
        return "No messes found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{}  {:>9}  {}\n", fit("Name", 24), "Members", "Created"));
    output.push_str(&"-".repeat(48));
    output.push('\n');

    for mess in messes {
        output.push_str(&format!(
            "{}  {:>9}  {}\n",
            fit(&mess.name, 24),
            format!("{}/{}", mess.members.len(), mess.member_limit),
            mess.created_at.format("%Y-%m-%d")
        ));
    }

    output
}

/// Format a mess with its roster
pub fn format_mess_details(mess: &Mess, names: &HashMap<MemberId, String>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Mess:    {}\n", mess.name));
    output.push_str(&format!("ID:      {}\n", mess.id));
    output.push_str(&format!(
        "Members: {}/{}\n",
        mess.members.len(),
        mess.member_limit
    ));
    output.push_str(&format!("Created: {}\n\n", mess.created_at.format("%Y-%m-%d")));

    for membership in &mess.members {
        let name = names
            .get(&membership.member_id)
            .cloned()
            .unwrap_or_else(|| membership.member_id.to_string());
        output.push_str(&format!(
            "  {}  {:8}  joined {}\n",
            fit(&name, 20),
            membership.role.to_string(),
            membership.joined_at.format("%Y-%m-%d")
        ));
    }

    output
}

/// Format the global member list
pub fn format_member_list(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members found.\n".to_string();
    }

    members
        .iter()
        .map(|m| format!("{}  {}\n", fit(&m.name, 24), m.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessRole;

    #[test]
    fn test_mess_details_shows_roles() {
        let owner = MemberId::new();
        let bob = MemberId::new();
        let mut mess = Mess::new("Flat 4B", owner, 8);
        mess.add_member(bob, MessRole::Admin);
        let names = HashMap::from([(owner, "Alice".to_string()), (bob, "Bob".to_string())]);

        let output = format_mess_details(&mess, &names);
        assert!(output.contains("Members: 2/8"));
        assert!(output.contains("Owner"));
        assert!(output.contains("Admin"));
    }

    #[test]
    fn test_mess_list() {
        let mess = Mess::new("Flat 4B", MemberId::new(), 8);
        let output = format_mess_list(&[mess]);
        assert!(output.contains("Flat 4B"));
        assert!(output.contains("1/8"));
    }
}
