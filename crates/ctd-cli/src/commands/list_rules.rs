//! List rules command implementation.

use ctd_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Built-in rules:\n");
    println!("{:<28} Description", "Key");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!("{:<28} {}", rule.key(), rule.description());
        println!("{:<28} columns: {}", "", rule.meta().headers.join(", "));
        println!("{:<28} split to: {}", "", rule.meta().result_path);
    }

    println!("\nMore rules of the same shape can be declared in ctd.toml:");
    println!("  [[plugins]]");
    println!("  [plugins.meta]     key, headers, header_keys, result_path");
    println!("  [plugins.execute]  receiver, methods, tag_enum, ...");
    println!("\nUse --rules to run only some of them, e.g.:");
    println!("  ctd scan --rules findCrashAnalyticService");
}
