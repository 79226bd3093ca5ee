//! Reply model → serenity builders.
//!
//! The same `Reply` feeds five different builders. For edits and updates an
//! absent field means "leave it as it is": `content: None`, no embeds and
//! `components: None` are simply not sent.

use clove_core::{ActionRow, ButtonStyle, Component, Embed, Reply};
use serenity::all::{
    ButtonStyle as SerenityButtonStyle, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
    CreateMessage, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
    EditInteractionResponse, ReactionType, Timestamp,
};

/// Discord rejects message content above this many characters.
const MAX_CONTENT: usize = 2000;

fn truncate(s: &str) -> &str {
    if s.len() <= MAX_CONTENT {
        return s;
    }
    let mut end = MAX_CONTENT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub fn build_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    if embed.timestamp {
        builder = builder.timestamp(Timestamp::now());
    }
    builder
}

fn button_style(style: ButtonStyle) -> SerenityButtonStyle {
    match style {
        ButtonStyle::Primary => SerenityButtonStyle::Primary,
        ButtonStyle::Secondary => SerenityButtonStyle::Secondary,
        ButtonStyle::Success => SerenityButtonStyle::Success,
        ButtonStyle::Danger => SerenityButtonStyle::Danger,
    }
}

/// One serenity row per model row. A row holding a select menu becomes a
/// select row; anything else is a button row.
pub fn build_action_rows(rows: &[ActionRow]) -> Vec<CreateActionRow> {
    rows.iter()
        .filter_map(|row| {
            let menu = row.components.iter().find_map(|c| match c {
                Component::SelectMenu(menu) => Some(menu),
                Component::Button(_) => None,
            });
            if let Some(menu) = menu {
                let options = menu
                    .options
                    .iter()
                    .map(|opt| {
                        let mut o = CreateSelectMenuOption::new(&opt.label, &opt.value);
                        if let Some(description) = &opt.description {
                            o = o.description(description);
                        }
                        if let Some(emoji) = &opt.emoji {
                            o = o.emoji(ReactionType::Unicode(emoji.clone()));
                        }
                        o
                    })
                    .collect();
                let mut select = CreateSelectMenu::new(&menu.custom_id, CreateSelectMenuKind::String { options })
                    .disabled(menu.disabled);
                if let Some(placeholder) = &menu.placeholder {
                    select = select.placeholder(placeholder);
                }
                return Some(CreateActionRow::SelectMenu(select));
            }

            let buttons: Vec<CreateButton> = row
                .components
                .iter()
                .filter_map(|c| match c {
                    Component::Button(b) => Some(
                        CreateButton::new(&b.custom_id)
                            .label(&b.label)
                            .style(button_style(b.style))
                            .disabled(b.disabled),
                    ),
                    Component::SelectMenu(_) => None,
                })
                .collect();
            (!buttons.is_empty()).then_some(CreateActionRow::Buttons(buttons))
        })
        .collect()
}

fn embeds(reply: &Reply) -> Vec<CreateEmbed> {
    reply.embeds.iter().map(build_embed).collect()
}

/// Primary reply, or the new message body of a component update.
pub fn response_message(reply: &Reply) -> CreateInteractionResponseMessage {
    let mut msg = CreateInteractionResponseMessage::new();
    if let Some(content) = &reply.content {
        msg = msg.content(truncate(content));
    }
    if !reply.embeds.is_empty() {
        msg = msg.embeds(embeds(reply));
    }
    if let Some(rows) = &reply.components {
        msg = msg.components(build_action_rows(rows));
    }
    if reply.ephemeral {
        msg = msg.ephemeral(true);
    }
    msg
}

pub fn edit_response(reply: &Reply) -> EditInteractionResponse {
    let mut edit = EditInteractionResponse::new();
    if let Some(content) = &reply.content {
        edit = edit.content(truncate(content));
    }
    if !reply.embeds.is_empty() {
        edit = edit.embeds(embeds(reply));
    }
    if let Some(rows) = &reply.components {
        edit = edit.components(build_action_rows(rows));
    }
    edit
}

pub fn followup(reply: &Reply) -> CreateInteractionResponseFollowup {
    let mut builder = CreateInteractionResponseFollowup::new();
    if let Some(content) = &reply.content {
        builder = builder.content(truncate(content));
    }
    if !reply.embeds.is_empty() {
        builder = builder.embeds(embeds(reply));
    }
    if let Some(rows) = &reply.components {
        builder = builder.components(build_action_rows(rows));
    }
    if reply.ephemeral {
        builder = builder.ephemeral(true);
    }
    builder
}

/// Direct message body. Ephemerality has no meaning outside interactions.
pub fn direct_message(reply: &Reply) -> CreateMessage {
    let mut msg = CreateMessage::new();
    if let Some(content) = &reply.content {
        msg = msg.content(truncate(content));
    }
    if !reply.embeds.is_empty() {
        msg = msg.embeds(embeds(reply));
    }
    if let Some(rows) = &reply.components {
        msg = msg.components(build_action_rows(rows));
    }
    msg
}
