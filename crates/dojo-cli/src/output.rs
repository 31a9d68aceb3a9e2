use colored::Colorize;
use comfy_table::{presets::NOTHING, ContentArrangement, Table};
use dojo_shared::{Decision, GraduatedGuardian};

pub fn print_header(title: &str) {
    let line = "─".repeat(36);
    println!();
    println!("  {}", title.bold());
    println!("  {}", line.dimmed());
}

pub fn print_record_summary(total: i64, by_decision: &[(Decision, i64)]) {
    print_header("Guardian Dojo — Record Store");
    println!("  {}  {}", "Total records:".dimmed(), total);
    println!();

    let mut table = Table::new();
    table.load_preset(NOTHING).set_content_arrangement(ContentArrangement::Dynamic);
    for (decision, count) in by_decision {
        table.add_row(vec![decision.to_string(), count.to_string()]);
    }
    println!("{table}");
}

pub fn print_generation_result(
    generation: u64,
    best_fitness: f64,
    avg_fitness: f64,
    best_detection_rate: f64,
    best_false_positive_rate: f64,
) {
    println!(
        "  {} {}  {} {}  {} {}  {} {}  {} {}",
        "gen".dimmed(),
        generation,
        "best".dimmed(),
        format!("{best_fitness:.3}").green(),
        "avg".dimmed(),
        format!("{avg_fitness:.3}"),
        "detect".dimmed(),
        format!("{:.2}", best_detection_rate),
        "fpr".dimmed(),
        format!("{:.2}", best_false_positive_rate),
    );
}

pub fn print_graduated_table(graduated: &[GraduatedGuardian]) {
    print_header("Graduated Guardians");
    if graduated.is_empty() {
        println!("  {}", "No guardians have graduated yet.".dimmed());
        return;
    }

    let mut table = Table::new();
    table.load_preset(NOTHING).set_content_arrangement(ContentArrangement::Dynamic);
    for g in graduated {
        table.add_row(vec![
            g.name.clone().bold().to_string(),
            g.generation.to_string(),
            format!("{:.3}", g.fitness),
            format!("{:.2}", g.detection_rate),
            format!("{:.2}", g.false_positive_rate),
        ]);
    }
    println!("{table}");
}
