/*!
Global verbs: `show`, `list`, `set`, `load`, `drop`.

Registered once at the root and reachable everywhere by bubbling. Target
domain resolution:
  1. an explicit name is looked up over the whole tree (not by bubbling)
  2. if the name is not a domain but the cursor sits inside one, the name is
     taken as an item of that domain
  3. with no name, the nearest domain at or above the cursor is used
The target's declared verb set is checked before anything is delegated.
*/

use std::io::Write;

use anyhow::Result;

use super::{ArgSpec, Arity, CommandContext, CommandSpec, CommandTree, Flow};
use crate::domain::{Domain, Verb};
use crate::tree::NodeId;

pub fn command(verb: Verb) -> CommandSpec {
    let spec = CommandSpec::new(help_for(verb), move |ctx| {
        match verb {
            Verb::Show => show(ctx)?,
            Verb::List => list(ctx)?,
            Verb::Set => set(ctx)?,
            Verb::Load => load(ctx)?,
            Verb::Drop => drop_item(ctx)?,
        }
        Ok(Flow::Continue)
    });

    match verb {
        Verb::List => spec.arg(ArgSpec::new(
            "domain",
            Arity::Optional,
            "Domain to list items from",
        )),
        Verb::Set | Verb::Load => spec
            .arg(ArgSpec::new("target", Arity::Required, "Domain or item name"))
            .arg(ArgSpec::new(
                "name",
                Arity::Optional,
                "Item name (if target is domain)",
            )),
        Verb::Show | Verb::Drop => spec
            .arg(ArgSpec::new("target", Arity::Optional, "Domain or item name"))
            .arg(ArgSpec::new(
                "name",
                Arity::Optional,
                "Item name (if target is domain)",
            )),
    }
}

fn help_for(verb: Verb) -> &'static str {
    match verb {
        Verb::Show => "Show item details or active items.",
        Verb::List => "List items in a domain.",
        Verb::Set => "Set the active item.",
        Verb::Load => "Load an item from storage.",
        Verb::Drop => "Remove an item from the session.",
    }
}

type Found<'t> = (NodeId, &'t dyn Domain);

fn domain_at(tree: &CommandTree, id: NodeId) -> Option<Found<'_>> {
    tree.node(id).domain().map(|d| (id, d))
}

/// Full-tree search by name.
pub fn find_domain<'t>(tree: &'t CommandTree, name: &str) -> Option<Found<'t>> {
    tree.find_domain(name).and_then(|id| domain_at(tree, id))
}

/// Nearest domain at or above the cursor.
pub fn current_domain(tree: &CommandTree, cursor: NodeId) -> Option<Found<'_>> {
    tree.ancestors(cursor).find_map(|id| domain_at(tree, id))
}

enum Target<'t> {
    Domain(Found<'t>, Option<String>),
    Unknown(String),
    NoContext,
}

/// Resolve `target` / `name` into a domain and an item name.
fn resolve<'t>(
    tree: &'t CommandTree,
    cursor: NodeId,
    target: Option<&str>,
    name: Option<&str>,
) -> Target<'t> {
    let name = name.map(str::to_string);
    match target {
        Some(target) => {
            if let Some(found) = find_domain(tree, target) {
                Target::Domain(found, name)
            } else if let Some(found) = current_domain(tree, cursor) {
                Target::Domain(found, Some(target.to_string()))
            } else {
                Target::Unknown(target.to_string())
            }
        }
        None => match current_domain(tree, cursor) {
            Some(found) => Target::Domain(found, name),
            None => Target::NoContext,
        },
    }
}

/// Print the refusal and return `false` when `domain` does not declare `verb`.
fn check_verb(out: &mut dyn Write, domain: &dyn Domain, verb: Verb) -> Result<bool> {
    if domain.supports(verb) {
        return Ok(true);
    }
    writeln!(out, "'{verb}' is not available in this context.")?;
    Ok(false)
}

fn show(ctx: &mut CommandContext<'_>) -> Result<()> {
    let tree = ctx.tree;
    let target = resolve(tree, ctx.session.current, ctx.value("target"), ctx.value("name"));

    let ((id, domain), name) = match target {
        Target::Domain(found, name) => (found, name),
        Target::Unknown(target) => {
            writeln!(ctx.out, "Domain '{target}' not found.")?;
            return Ok(());
        }
        Target::NoContext => return show_all_actives(ctx),
    };
    let domain_name = tree.node(id).name();

    if domain.has_nested_domains() && name.is_none() {
        let nested: Vec<Found<'_>> = tree
            .node(id)
            .children()
            .iter()
            .filter_map(|child| domain_at(tree, *child))
            .collect();
        if nested.is_empty() {
            match domain.get_active(ctx.session) {
                Some(active) => writeln!(ctx.out, "{domain_name}: {active}")?,
                None => writeln!(ctx.out, "No active {domain_name}.")?,
            }
        }
        for (child, nested) in nested {
            let active = nested.get_active(ctx.session);
            writeln!(
                ctx.out,
                "{}: {}",
                tree.node(child).name(),
                active.as_deref().unwrap_or("(none)")
            )?;
        }
        return Ok(());
    }

    if !check_verb(ctx.out, domain, Verb::Show)? {
        return Ok(());
    }

    match domain.show_item(ctx.session, name.as_deref()) {
        Some(details) => writeln!(ctx.out, "{details}")?,
        None => match name.or_else(|| domain.get_active(ctx.session)) {
            Some(item) => writeln!(ctx.out, "'{item}' not found.")?,
            None => writeln!(ctx.out, "No active {domain_name}.")?,
        },
    }
    Ok(())
}

/// Root-level `show`: every top-level domain's active item, plus nested ones.
fn show_all_actives(ctx: &mut CommandContext<'_>) -> Result<()> {
    let tree = ctx.tree;
    let mut any = false;
    for child in tree.node(tree.root()).children() {
        let Some((_, domain)) = domain_at(tree, *child) else {
            continue;
        };
        any = true;
        let active = domain.get_active(ctx.session);
        writeln!(
            ctx.out,
            "{}: {}",
            tree.node(*child).name(),
            active.as_deref().unwrap_or("(none)")
        )?;
        for (nested, active) in domain.get_nested_actives(ctx.session) {
            writeln!(ctx.out, "  {nested}: {active}")?;
        }
    }
    if !any {
        writeln!(ctx.out, "No domains configured.")?;
    }
    Ok(())
}

fn list(ctx: &mut CommandContext<'_>) -> Result<()> {
    let tree = ctx.tree;
    let requested = ctx.value("domain").map(str::to_string);
    let found = match &requested {
        Some(name) => find_domain(tree, name),
        None => current_domain(tree, ctx.session.current),
    };
    let Some((id, domain)) = found else {
        match requested {
            Some(name) => writeln!(ctx.out, "Domain '{name}' not found.")?,
            None => writeln!(
                ctx.out,
                "Not in a domain context. Specify a domain: list <domain>"
            )?,
        }
        return Ok(());
    };

    if !check_verb(ctx.out, domain, Verb::List)? {
        return Ok(());
    }

    let items = domain.list_items(ctx.session);
    if items.is_empty() {
        writeln!(ctx.out, "No {}s available.", tree.node(id).name())?;
        return Ok(());
    }
    let active = domain.get_active(ctx.session);
    for item in items {
        let marker = if active.as_deref() == Some(item.as_str()) {
            "* "
        } else {
            "  "
        };
        writeln!(ctx.out, "{marker}{item}")?;
    }
    Ok(())
}

/// Shared resolution for `set` and `load`, which both need an item name.
fn resolve_named<'t>(
    ctx: &mut CommandContext<'t>,
    verb: Verb,
) -> Result<Option<(Found<'t>, String)>> {
    let tree = ctx.tree;
    let target = ctx.value("target").unwrap_or_default().to_string();
    match resolve(tree, ctx.session.current, Some(&target), ctx.value("name")) {
        Target::Domain(found, Some(name)) => Ok(Some((found, name))),
        Target::Domain(_, None) => {
            writeln!(ctx.out, "Usage: {verb} {target} <name>")?;
            Ok(None)
        }
        Target::Unknown(target) => {
            writeln!(ctx.out, "Domain '{target}' not found.")?;
            Ok(None)
        }
        Target::NoContext => Ok(None),
    }
}

fn set(ctx: &mut CommandContext<'_>) -> Result<()> {
    let Some(((id, domain), name)) = resolve_named(ctx, Verb::Set)? else {
        return Ok(());
    };
    if !check_verb(ctx.out, domain, Verb::Set)? {
        return Ok(());
    }
    if !domain.set_active(ctx.session, &name, ctx.out)? {
        writeln!(ctx.out, "'{name}' not found in {}.", ctx.tree.node(id).name())?;
    }
    Ok(())
}

fn load(ctx: &mut CommandContext<'_>) -> Result<()> {
    let Some(((_, domain), name)) = resolve_named(ctx, Verb::Load)? else {
        return Ok(());
    };
    if !check_verb(ctx.out, domain, Verb::Load)? {
        return Ok(());
    }
    domain.load_item(ctx.session, &name, ctx.out)?;
    Ok(())
}

fn drop_item(ctx: &mut CommandContext<'_>) -> Result<()> {
    let tree = ctx.tree;
    let target = resolve(tree, ctx.session.current, ctx.value("target"), ctx.value("name"));
    let ((_, domain), name) = match target {
        Target::Domain(found, name) => (found, name),
        Target::Unknown(target) => {
            writeln!(ctx.out, "Domain '{target}' not found.")?;
            return Ok(());
        }
        Target::NoContext => {
            writeln!(
                ctx.out,
                "Not in a domain context. Specify a domain: drop <domain> [name]"
            )?;
            return Ok(());
        }
    };
    if !check_verb(ctx.out, domain, Verb::Drop)? {
        return Ok(());
    }
    domain.drop_item(ctx.session, name.as_deref(), ctx.out)?;
    Ok(())
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::tests::shell;
    use crate::domain::tests::StubDomain;
    use crate::session::tests::pinned_session;
    use crate::tree::{Detached, Payload};

    /// Verbs at the root, a `colors` domain (show/list/set) holding a nested
    /// `shades` domain, an empty `spells` domain, and a plain `misc` group.
    fn sample() -> CommandTree {
        let mut tree = CommandTree::new();
        for verb in Verb::variants() {
            tree.insert(&[verb.as_str()], Payload::Raw(command(*verb)))
                .unwrap();
        }
        let colors = Detached::domain(
            "colors",
            StubDomain::new(&["show", "list", "set"]).with_items(&["red", "green"]),
        );
        tree.insert(&["colors"], Payload::Node(colors)).unwrap();
        tree.insert(
            &["colors", "shades"],
            Payload::Node(Detached::domain(
                "shades",
                StubDomain::new(&["show", "list", "set"]).with_items(&["dark"]),
            )),
        )
        .unwrap();
        tree.insert(
            &["spells"],
            Payload::Node(Detached::domain("spells", StubDomain::new(&["list"]))),
        )
        .unwrap();
        tree.insert(
            &["misc", "noop"],
            Payload::Raw(CommandSpec::new("noop", |_| Ok(Flow::Continue))),
        )
        .unwrap();
        tree
    }

    #[test]
    fn list_marks_active_item() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        assert_eq!(shell(&tree, &mut session, "set colors green"), "");
        assert_eq!(shell(&tree, &mut session, "list colors"), "  red\n* green\n");
    }

    #[test]
    fn list_reports_missing_context_and_empties() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        assert_eq!(
            shell(&tree, &mut session, "list"),
            "Not in a domain context. Specify a domain: list <domain>\n"
        );
        assert_eq!(
            shell(&tree, &mut session, "list dragons"),
            "Domain 'dragons' not found.\n"
        );
        assert_eq!(
            shell(&tree, &mut session, "list spells"),
            "No spellss available.\n"
        );
    }

    #[test]
    fn explicit_name_searches_whole_tree() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        session.current = tree.get(&["misc"]).unwrap();
        assert_eq!(shell(&tree, &mut session, "list shades"), "  dark\n");
    }

    #[test]
    fn implicit_domain_from_cursor() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        shell(&tree, &mut session, "colors");
        assert_eq!(shell(&tree, &mut session, "list"), "  red\n  green\n");
    }

    #[test]
    fn item_name_fallback_inside_domain() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        session.current = tree.get(&["colors"]).unwrap();
        assert_eq!(shell(&tree, &mut session, "set red"), "");
        assert_eq!(shell(&tree, &mut session, "list"), "* red\n  green\n");
        assert_eq!(
            shell(&tree, &mut session, "set blue"),
            "'blue' not found in colors.\n"
        );
    }

    #[test]
    fn set_without_name_prints_usage() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        assert_eq!(
            shell(&tree, &mut session, "set colors"),
            "Usage: set colors <name>\n"
        );
        assert_eq!(
            shell(&tree, &mut session, "set dragons"),
            "Domain 'dragons' not found.\n"
        );
    }

    #[test]
    fn undeclared_verbs_are_refused() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        assert_eq!(
            shell(&tree, &mut session, "load colors red"),
            "'load' is not available in this context.\n"
        );
        assert_eq!(
            shell(&tree, &mut session, "drop colors"),
            "'drop' is not available in this context.\n"
        );
        assert_eq!(
            shell(&tree, &mut session, "show spells x"),
            "'show' is not available in this context.\n"
        );
    }

    #[test]
    fn show_item_and_missing_item() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        assert_eq!(shell(&tree, &mut session, "show shades"), "No active shades.\n");
        assert_eq!(shell(&tree, &mut session, "show shades dark"), "item: dark\n");
        assert_eq!(shell(&tree, &mut session, "show shades pale"), "'pale' not found.\n");
    }

    #[test]
    fn show_at_root_lists_top_level_actives() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        shell(&tree, &mut session, "set colors red");
        assert_eq!(
            shell(&tree, &mut session, "show"),
            "colors: red\nspells: (none)\n"
        );
    }

    #[test]
    fn drop_needs_a_context() {
        let tree = sample();
        let mut session = pinned_session(tree.root(), 1);
        assert_eq!(
            shell(&tree, &mut session, "drop"),
            "Not in a domain context. Specify a domain: drop <domain> [name]\n"
        );
    }

    #[test]
    fn nearest_enclosing_domain_wins() {
        let tree = sample();
        let shades = tree.get(&["colors", "shades"]).unwrap();
        assert_eq!(current_domain(&tree, shades).map(|(id, _)| id), Some(shades));
        let misc = tree.get(&["misc"]).unwrap();
        assert!(current_domain(&tree, misc).is_none());
        assert!(current_domain(&tree, tree.root()).is_none());
    }
}
