use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use ic_rules::{RuleBook, derive};

pub fn run(path: &Path, config: Option<&Path>) -> Result<(), String> {
    let actor = super::load_actor(path)?;
    let config = super::load_config(config)?;

    println!("  {}", actor.name.bold());
    println!();

    if actor.has_no_stats() {
        println!("  {}", "(no traits or skills)".dimmed());
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Stat", "Kind", "Dice"]);
        for t in &actor.traits {
            table.add_row(vec![
                t.display_name().to_string(),
                "trait".to_string(),
                t.dice.to_string(),
            ]);
        }
        for s in &actor.skills {
            table.add_row(vec![
                s.display_name().to_string(),
                format!("skill ({} marks)", s.marks),
                s.total.to_string(),
            ]);
        }
        println!("{table}");
        println!();
    }

    let book = RuleBook::build(&actor);
    let mut conditions = actor.conditions.clone();
    let stats = derive(&book, &config, &mut conditions);

    println!("  {}", "Movement".bold().underline());
    println!(
        "  stride {}  dash {}  run {}",
        stats.movement.stride, stats.movement.dash, stats.movement.run
    );
    if stats.movement.ignore_bad_footing {
        println!("  {}", "ignores bad footing".dimmed());
    }
    println!();

    println!("  {}", "Encumbrance".bold().underline());
    println!(
        "  carrying {:.2} stones, {} armor worn",
        stats.load.weight, stats.load.worn_armor
    );
    println!(
        "  limits {} / {} / {}  ({})",
        stats.limits.none, stats.limits.burdened, stats.limits.over_burdened, stats.status
    );
    let active: Vec<&str> = conditions.active().collect();
    if !active.is_empty() {
        println!("  conditions: {}", active.join(", "));
    }
    println!();

    let carried: Vec<_> = stats.coinage.lines.iter().filter(|l| l.amount > 0).collect();
    if !carried.is_empty() {
        println!("  {}", "Coinage".bold().underline());
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Currency", "Coins", "Value each", "Weight"]);
        for line in carried {
            table.add_row(vec![
                line.name.clone(),
                line.amount.to_string(),
                format!("{}", line.value),
                format!("{:.3}", line.weight),
            ]);
        }
        println!("{table}");
        println!("  total value {}", stats.coinage.value);
    }

    Ok(())
}
