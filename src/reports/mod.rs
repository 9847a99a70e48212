use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use gridboard::rubric::{Evaluation, PublishState, Rubric, StarRating};
use gridboard::scene::{PieceKey, Scene};
use std::collections::BTreeMap;

/// One replayed input and what came of it.
#[derive(Debug, Clone)]
pub struct StepLog {
    pub step: usize,
    pub piece: String,
    pub action: String,
    pub outcome: String,
}

fn piece_labels(scene: &Scene) -> BTreeMap<PieceKey, String> {
    scene
        .pieces()
        .map(|p| {
            let label = match p.id {
                Some(id) => id.to_string(),
                None => p.key().to_string(),
            };
            (p.key(), label)
        })
        .collect()
}

/// Board cells labelled with the piece holding them.
pub fn print_board_grid(scene: &Scene) {
    let board = scene.board();
    let labels = piece_labels(scene);

    println!(
        "\nBoard {}x{} ({} pieces)",
        board.rows(),
        board.cols(),
        scene.piece_count()
    );
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    for row in 0..board.rows() {
        let cells: Vec<Cell> = (0..board.cols())
            .map(|col| {
                let text = board
                    .try_get_cell(row, col)
                    .and_then(|c| c.primary())
                    .and_then(|k| labels.get(&k).cloned())
                    .unwrap_or_else(|| ".".to_string());
                Cell::new(text).set_alignment(CellAlignment::Center)
            })
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

pub fn print_rule_report(eval: &Evaluation) {
    if eval.rules.is_empty() {
        println!("\n(no rules evaluated)");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Rule").add_attribute(Attribute::Bold),
        Cell::new("Gate"),
        Cell::new("Weight"),
        Cell::new("Pass"),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Reason"),
    ]);

    for i in [0, 3, 5] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for r in &eval.rules {
        let pass_cell = if r.result.pass {
            Cell::new("yes").fg(Color::Green)
        } else if r.hard_gate {
            Cell::new("NO")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new("no").fg(Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(r.index),
            Cell::new(r.kind).add_attribute(Attribute::Bold),
            Cell::new(if r.hard_gate { "hard" } else { "" }),
            Cell::new(format!("{:.2}", r.weight)),
            pass_cell,
            Cell::new(format!("{:.3}", r.result.score)).fg(Color::Cyan),
            Cell::new(&r.result.reason),
        ]);
    }
    println!("\n{}", table);
}

fn publish_color(state: PublishState) -> Color {
    match state {
        PublishState::Locked => Color::Red,
        PublishState::Warning => Color::Yellow,
        PublishState::Ready => Color::Green,
    }
}

fn stars(rating: StarRating) -> String {
    let n = rating.count() as usize;
    format!("{}{}", "*".repeat(n), "-".repeat(3 - n))
}

pub fn print_summary(eval: &Evaluation, rubric: &Rubric) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Pieces").add_attribute(Attribute::Bold),
        Cell::new("Gates"),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Threshold"),
        Cell::new("Mode"),
        Cell::new("Publish").add_attribute(Attribute::Bold),
        Cell::new("Stars"),
    ]);

    for i in [0, 2, 3] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    table.add_row(vec![
        Cell::new(eval.piece_count),
        if eval.gates_passed {
            Cell::new("passed").fg(Color::Green)
        } else {
            Cell::new("failed").fg(Color::Red)
        },
        Cell::new(format!("{:.3}", eval.score)).fg(Color::Cyan),
        Cell::new(format!("{:.2}", rubric.threshold)),
        Cell::new(rubric.mode),
        Cell::new(eval.publish)
            .fg(publish_color(eval.publish))
            .add_attribute(Attribute::Bold),
        Cell::new(stars(eval.stars)),
    ]);
    println!("\n{}", table);
    // Plain line for scripts that grep the output.
    println!(
        "RESULT score={:.3} publish={} stars={}",
        eval.score,
        eval.publish,
        eval.stars.count()
    );
}

pub fn print_step_log(log: &[StepLog]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Step").add_attribute(Attribute::Bold),
        Cell::new("Piece"),
        Cell::new("Action"),
        Cell::new("Outcome"),
    ]);
    if let Some(col) = table.column_mut(0) {
        col.set_cell_alignment(CellAlignment::Right);
    }

    for entry in log {
        let outcome = if entry.outcome == "refused" || entry.outcome.starts_with("Reverted") {
            Cell::new(&entry.outcome).fg(Color::Yellow)
        } else {
            Cell::new(&entry.outcome)
        };
        table.add_row(vec![
            Cell::new(entry.step),
            Cell::new(&entry.piece),
            Cell::new(&entry.action),
            outcome,
        ]);
    }
    println!("\n{}", table);
}
