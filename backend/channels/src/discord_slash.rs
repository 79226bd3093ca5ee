//! Registry → Discord application command definitions.

use clove_commands::{CommandDefinition, CommandKind, CommandRegistry, OptionKind, OptionSchema, SubcommandSchema};
use serenity::all::{
    CommandOptionType, CommandType, CreateCommand, CreateCommandOption, InstallationContext,
    InteractionContext,
};

fn build_option(option: &OptionSchema) -> CreateCommandOption {
    let kind = match option.kind {
        OptionKind::String => CommandOptionType::String,
        OptionKind::User => CommandOptionType::User,
    };
    CreateCommandOption::new(kind, &option.name, &option.description)
        .required(option.required)
        .set_autocomplete(option.autocomplete)
}

fn build_subcommand(sub: &SubcommandSchema) -> CreateCommandOption {
    sub.options.iter().fold(
        CreateCommandOption::new(CommandOptionType::SubCommand, &sub.name, &sub.description),
        |builder, option| builder.add_sub_option(build_option(option)),
    )
}

/// Installable to guilds and users, usable in guilds, the bot's DMs and
/// private channels.
pub fn build_command(def: &CommandDefinition) -> CreateCommand {
    let command = CreateCommand::new(&def.name)
        .integration_types(vec![InstallationContext::Guild, InstallationContext::User])
        .contexts(vec![
            InteractionContext::Guild,
            InteractionContext::BotDm,
            InteractionContext::PrivateChannel,
        ]);

    match def.kind {
        CommandKind::ChatInput => {
            let command = command.kind(CommandType::ChatInput).description(&def.description);
            let command = def
                .subcommands
                .iter()
                .fold(command, |c, sub| c.add_option(build_subcommand(sub)));
            def.options.iter().fold(command, |c, option| c.add_option(build_option(option)))
        }
        CommandKind::User => command.kind(CommandType::User),
        CommandKind::Message => command.kind(CommandType::Message),
    }
}

pub fn build_commands(registry: &CommandRegistry) -> Vec<CreateCommand> {
    registry.all().map(build_command).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clove_commands::builtin_catalog;
    use serde_json::{Value, json};

    fn rendered() -> Vec<Value> {
        let registry = CommandRegistry::load(builtin_catalog());
        build_commands(&registry)
            .into_iter()
            .map(|c| serde_json::to_value(c).unwrap())
            .collect()
    }

    #[test]
    fn categories_become_subcommand_groups() {
        let commands = rendered();
        let dough = commands.iter().find(|c| c["name"] == "dough" && c["type"] == 1).unwrap();

        assert_eq!(dough["integration_types"], json!([0, 1]));
        assert_eq!(dough["contexts"], json!([0, 1, 2]));

        let add = &dough["options"][0];
        assert_eq!(add["type"], 1);
        assert_eq!(add["name"], "add");
        let member = &add["options"][0];
        assert_eq!(member["name"], "member");
        assert_eq!(member["required"], true);
        assert_eq!(member["autocomplete"], true);
    }

    #[test]
    fn context_menus_keep_their_kind() {
        let commands = rendered();
        let kinds: Vec<_> = commands
            .iter()
            .filter(|c| c["name"] == "Cheese")
            .map(|c| c["type"].as_u64().unwrap())
            .collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&2) && kinds.contains(&3));
    }
}
