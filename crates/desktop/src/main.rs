// Desktop front end: terminal rendition of the player screen

mod command;
mod render;

use clap::Parser;
use command::{Command, ParseError};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use musicplayer_core::{AudioSource, PlayerScreen, ScreenConfig};
use musicplayer_player::{init_logging, PlatformPlayerFactory};
use render::RedrawFlag;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "musicplayer")]
#[command(about = "Minimal music player: pick a song, seek, play/pause", long_about = None)]
struct Cli {
    /// Audio file to open at startup
    path: Option<PathBuf>,

    /// Seek bar refresh interval in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

/// Messages from the stdin reader thread
enum Input {
    Command(Command),
    Invalid(ParseError),
}

fn spawn_stdin_reader() -> Receiver<Input> {
    let (tx, rx) = crossbeam_channel::unbounded();

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            };
            let input = match command::parse(&line) {
                Ok(cmd) => Input::Command(cmd),
                Err(ParseError::Empty) => continue,
                Err(e) => Input::Invalid(e),
            };
            if tx.send(input).is_err() {
                break;
            }
        }
        log::debug!("Stdin reader exited");
    });

    rx
}

/// Apply one command; returns false when the user asked to quit
fn handle(screen: &mut PlayerScreen, cmd: Command) -> bool {
    let now = Instant::now();
    let result = match cmd {
        Command::Open(path) => screen.select_source(Some(AudioSource::from_path(path))),
        Command::Toggle => screen.toggle_play_pause(now),
        Command::Seek(position) => screen.seek(position, now),
        Command::Help => {
            println!("{}", command::HELP);
            Ok(())
        }
        Command::Quit => return false,
    };

    if let Err(e) = result {
        println!("{}", e);
    }
    true
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let config = ScreenConfig::default().with_frame_interval(Duration::from_millis(cli.frame_ms));
    let mut screen = PlayerScreen::new(PlatformPlayerFactory, config);
    let redraw = Arc::new(RedrawFlag::new());
    screen.add_observer(redraw.clone());

    if let Some(path) = cli.path {
        if let Err(e) = screen.select_source(Some(AudioSource::from_path(path))) {
            println!("{}", e);
        }
    }

    println!("{}", command::HELP);
    let input = spawn_stdin_reader();
    let mut last_line = String::new();

    loop {
        if redraw.take() {
            let line = render::render(&screen.view());
            if line != last_line {
                println!("{}", line);
                last_line = line;
            }
        }

        let received = match screen.next_deadline(Instant::now()) {
            Some(deadline) => input.recv_deadline(deadline),
            None => input.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Input::Command(cmd)) => {
                if !handle(&mut screen, cmd) {
                    break;
                }
            }
            Ok(Input::Invalid(e)) => println!("{}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        screen.poll(Instant::now());
    }

    log::info!("Exiting");
}
