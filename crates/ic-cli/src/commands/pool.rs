use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use ic_core::condition::names;
use ic_core::{ConditionStore, KeyList};
use ic_rules::pool::resolve_limit;
use ic_rules::{
    Action, DefenseKind, OpposingItem, PoolOptions, QueryContext, RuleBook, build_extra,
    build_pool, finish, prepare_action,
};

use crate::ActionArg;

/// Everything the `pool` command was asked for.
pub struct PoolArgs<'a> {
    pub actor: &'a Path,
    pub config: Option<&'a Path>,
    pub action: ActionArg,
    pub item: Option<&'a str>,
    pub stats: &'a str,
    pub gifts: &'a str,
    pub extra: &'a str,
    pub limit: Option<&'a str>,
    pub against: Option<&'a str>,
    pub conditions: &'a str,
    pub weak: bool,
    pub burdened: bool,
    pub autocheck_armor: bool,
}

pub fn run(args: PoolArgs<'_>) -> Result<(), String> {
    let actor = super::load_actor(args.actor)?;
    let config = super::load_config(args.config)?;

    let mut conditions = actor.conditions.clone();
    let extra_conditions = super::split_list(args.conditions);
    let extra_conditions: Vec<&str> = extra_conditions.iter().map(String::as_str).collect();
    conditions.add(&extra_conditions);
    if args.burdened {
        conditions.add(&[names::BURDENED]);
    }
    let burdened = conditions.has_any(&[names::BURDENED]);

    let item = match args.item {
        Some(name) => Some(
            actor
                .item_named(name)
                .ok_or_else(|| format!("item not found: \"{name}\""))?,
        ),
        None => None,
    };
    let opposing = args.against.map(|d| OpposingItem {
        name: String::new(),
        descriptors: KeyList::parse(d),
        effects: KeyList::default(),
    });

    let action = match args.action {
        ActionArg::Attack => Action::Attack,
        ActionArg::Dodge => Action::Defense(DefenseKind::Dodge),
        ActionArg::Parry => Action::Defense(DefenseKind::Parry),
        ActionArg::Defense => Action::Defense(DefenseKind::Special),
        ActionArg::Counter => Action::Counter,
        ActionArg::Resist => Action::Resist,
        ActionArg::Soak => Action::Soak {
            autocheck_armor: args.autocheck_armor,
        },
        ActionArg::Initiative => Action::Initiative,
        ActionArg::Sprint => Action::Sprint,
        ActionArg::Skill => Action::Skill(super::split_list(args.stats)),
        ActionArg::Gifts => Action::Gifts(super::split_list(args.gifts)),
    };

    let book = RuleBook::build(&actor);
    let mut ctx = QueryContext::new(&conditions);
    if let Some(item) = item {
        ctx = ctx.with_item(item);
    }
    if let Some(opposing) = &opposing {
        ctx = ctx.with_other_item(opposing);
    }

    let construction = prepare_action(&book, &action, &ctx);
    let stats = build_pool(&actor, &construction.prechecked, burdened, &config)
        .map_err(|e| e.to_string())?;
    let extra = build_extra(&construction, args.extra, &config);
    let limit = args
        .limit
        .and_then(|text| resolve_limit(&actor, text, burdened, &config));
    let finished = finish(
        &construction,
        stats,
        extra,
        PoolOptions {
            limit,
            double: args.weak,
        },
    );

    println!("  {}", finished.label.bold());
    println!();

    if !construction.fields.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["", "Field", "Dice", "Exhausts"]);
        for field in &construction.fields {
            table.add_row(vec![
                if field.checked { "x" } else { " " }.to_string(),
                field.name.clone(),
                field.dice.to_string(),
                if field.exhausts_on_use { "yes" } else { "" }.to_string(),
            ]);
        }
        println!("{table}");
        println!();
    }

    if finished.pools.is_empty() {
        println!("  {}", "(empty pool)".dimmed());
    } else {
        let arrays: Vec<String> = finished.pools.iter().map(|d| d.to_string()).collect();
        println!("  pool:  {}", arrays.join(" | "));
        println!("  total: {}", finished.total().format(false));
    }
    if let Some(limit) = limit {
        println!("  {}", format!("limited to {limit}").dimmed());
    }
    for record in &finished.exhaust {
        println!("  {} {}", "exhausts".yellow().bold(), record.name);
    }

    Ok(())
}
