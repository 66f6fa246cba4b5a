use std::path::Path;

use ic_rules::validate_actor;

pub fn run(path: &Path) -> Result<(), String> {
    let actor = super::load_actor(path)?;
    let issues = validate_actor(&actor);

    for issue in &issues {
        eprintln!("  {issue}");
    }

    let errors = issues.iter().filter(|i| i.is_error).count();
    let warnings = issues.len() - errors;
    if errors > 0 {
        return Err(format!(
            "{} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        ));
    }

    let rules: usize = actor
        .items
        .iter()
        .filter_map(|i| i.as_gift())
        .map(|g| g.special_settings.len())
        .sum();
    println!("  All checks passed for '{}'.", actor.name);
    println!(
        "  {} traits, {} skills, {} items, {} gift rules",
        actor.traits.len(),
        actor.skills.len(),
        actor.items.len(),
        rules
    );
    if warnings > 0 {
        println!("  {} warning{}", warnings, if warnings == 1 { "" } else { "s" });
    }
    Ok(())
}
