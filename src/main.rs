use chrono::Local;
use clap::Parser;
use env_logger::Target;
use log::{LevelFilter, warn};
use std::error::Error;
use std::io::{self, BufRead, Write};
use xiangqi::display_format::DisplayFormat;
use xiangqi::game::Game;
use xiangqi::location::Move;
use xiangqi::piece::Side;

#[derive(Parser, Debug)]
#[command(about = "Play Xiangqi on the terminal, entering moves such as `h3 h10`")]
struct Arguments {
    #[arg(long, default_value_t = false, help = "print notation letters instead of Chinese characters")]
    ascii: bool,

    #[arg(long, default_value_t = false, help = "do not colour red pieces")]
    plain: bool,

    #[arg(long, help = "start from this position instead of the opening")]
    fen: Option<String>,

    #[arg(long, default_value_t = false, help = "black moves first from the given position")]
    black: bool,

    #[arg(short, long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

fn main() -> Result<(), Box<dyn Error>> {
    let arguments = Arguments::parse();

    env_logger::Builder::new()
        .filter_level(arguments.log_level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{style}[{}] [{:5}]{style:#} {}",
                Local::now().format("%T%.3f"),
                record.level(),
                record.args(),
                style = buf.default_level_style(record.level()),
            )
        })
        .target(Target::Stderr)
        .init();

    DisplayFormat::set_default_chinese(!arguments.ascii);
    DisplayFormat::set_default_colour(!arguments.plain);

    let turn = if arguments.black { Side::Black } else { Side::Red };
    let mut game = match &arguments.fen {
        Some(fen) => Game::from_fen(fen, turn)?,
        None => Game::opening(),
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!("{}", game.display(DisplayFormat::pretty()));

        if game.game_state().is_finished() {
            println!("{}", game.game_state());
            return Ok(());
        }

        let input = loop {
            print!("{} to move> ", game.turn());
            io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            let line = line.trim().to_ascii_lowercase();
            if line.is_empty() {
                continue;
            }
            break line;
        };

        if input == "quit" || input == "exit" {
            return Ok(());
        }

        match input.parse::<Move>() {
            Ok(mv) => {
                if let Err(rejection) = game.play(mv) {
                    println!("illegal move: {rejection}");
                }
            }
            Err(err) => {
                warn!("could not read move '{input}'");
                println!("{err}");
            }
        }
    }
}
