use anyhow::Result;

use wsroots::workspace::{format_path_with_hint, parse_workspace_hint, Manager, Resolver};

pub fn run_resolve(manager: &Manager, input: &str, disambiguate: bool) -> Result<()> {
    let resolver = Resolver::new(manager);

    let resolved = match parse_workspace_hint(input) {
        (None, path) if disambiguate => resolver.resolve_path_with_disambiguation(path)?,
        (hint, path) => resolver.resolve_path(path, hint)?,
    };

    let exists = resolved.absolute_path.exists();
    println!("{}", resolved.absolute_path.display());
    println!("  workspace: {}", resolved.root.name);
    println!(
        "  relative:  {}",
        format_path_with_hint(&resolved.root.name, &resolved.relative_path.to_string_lossy())
    );
    println!("  exists:    {}", if exists { "yes" } else { "no" });

    Ok(())
}

pub fn run_which(manager: &Manager, path: &str) -> Result<()> {
    match Resolver::new(manager).workspace_for_path(path) {
        Some(name) => println!("{}", name),
        None => eprintln!("{} is not inside any workspace", path),
    }
    Ok(())
}

pub fn run_find(manager: &Manager, path: &str) -> Result<()> {
    let resolver = Resolver::new(manager);
    let matches = resolver.disambiguate_path(path);

    if matches.is_empty() {
        println!("{} does not exist in any workspace", path);
        return Ok(());
    }
    for name in &matches {
        println!("{}", format_path_with_hint(name, path));
    }
    if matches.len() > 1 && resolver.file_exists(path) {
        let chosen = resolver.resolve_path_with_disambiguation(path)?;
        println!("\nDefault: {}", chosen.root.name);
    }
    Ok(())
}
