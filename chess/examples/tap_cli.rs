// Command-line application to play chess by tapping squares
//
// Each input line is a square name, like `e2`. The first tap selects a piece and the second one moves it.
// Type `new` to start over and `quit` to leave. Set `RUST_LOG=tapchess=debug` to see engine events.

use tapchess::{board::PrettyStyle, Color, Coord, Game, MoveKind, MoveReport};
use std::io::{self, BufRead, Write};

fn side_name(c: Color) -> &'static str {
    match c {
        Color::White => "White",
        Color::Black => "Black",
    }
}

fn announce(report: &MoveReport) {
    let what = match (report.kind(), report.captured) {
        (MoveKind::CastlingKingside, _) => "castles kingside".to_string(),
        (MoveKind::CastlingQueenside, _) => "castles queenside".to_string(),
        (MoveKind::PromoteQueen, Some(_)) => "captures and promotes to a queen".to_string(),
        (MoveKind::PromoteQueen, None) => "promotes to a queen".to_string(),
        (MoveKind::Simple, Some(cell)) => format!("captures {}", cell.as_utf8_char()),
        (MoveKind::Simple, None) => "moves".to_string(),
    };
    println!("{} {}: {}", side_name(report.mv.side()), what, report.mv);
    if report.status.is_finished() {
        println!("Game finished: {}", report.status);
    } else if report.check {
        println!("Check!");
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tapchess=info".into()),
        )
        .init();

    let mut stdin = io::stdin().lock();
    let mut game = Game::new();

    loop {
        println!("{}", game.board().pretty(PrettyStyle::Utf8));
        for color in [Color::White, Color::Black] {
            let captured: String = game
                .captured(color)
                .iter()
                .map(|c| c.as_utf8_char())
                .collect();
            if !captured.is_empty() {
                println!("{} captured: {}", side_name(color), captured);
            }
        }
        if game.is_check() {
            let checkers: Vec<String> = game
                .board()
                .checkers(game.side())
                .into_iter()
                .map(|c| c.to_string())
                .collect();
            println!("{} is in check from {}", side_name(game.side()), checkers.join(" "));
        }
        if let Some(src) = game.selected() {
            let dsts: Vec<String> = game
                .legal_destinations()
                .into_iter()
                .map(|c| c.to_string())
                .collect();
            println!("Selected {}, moves: {}", src, dsts.join(" "));
        }
        if game.status().is_finished() {
            print!("Type `new` to play again: ");
        } else {
            print!("{} to tap: ", side_name(game.side()));
        }
        io::stdout().flush()?;

        let mut s = String::new();
        if stdin.read_line(&mut s)? == 0 {
            break;
        }
        let s = s.trim();
        println!();

        match s {
            "quit" => break,
            "new" => {
                game.reset();
                continue;
            }
            _ => {}
        }

        let coord: Coord = match s.parse() {
            Ok(coord) => coord,
            Err(e) => {
                println!("Bad square: {}", e);
                continue;
            }
        };
        if let Some(report) = game.tap(coord) {
            announce(&report);
        }
    }

    Ok(())
}
