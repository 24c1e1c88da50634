//! Line-oriented stand-in for the visual layer. User input and fetch
//! completions are multiplexed on one task, which owns the session.

mod commands;
mod render;

pub use commands::{Command, HELP};
pub use render::Renderer;

use std::sync::Arc;

use anyhow::Context;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};

use crate::{
    session::FetchCoordinator,
    storage::{MemoStore, memo_or_placeholder},
};

pub struct Console {
    coordinator: FetchCoordinator,
    memos: Arc<dyn MemoStore>,
    renderer: Arc<Renderer>,
}

impl Console {
    pub fn new(
        coordinator: FetchCoordinator,
        memos: Arc<dyn MemoStore>,
        renderer: Arc<Renderer>,
    ) -> Self {
        Self {
            coordinator,
            memos,
            renderer,
        }
    }

    pub async fn run(mut self, mut busy: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", HELP);
        self.coordinator.trigger_feed_fetch();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read from stdin")? else {
                        break;
                    };
                    match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.handle(command).await,
                        Err(message) => eprintln!("{}", message),
                    }
                }
                Some(completion) = self.coordinator.next_completion() => {
                    self.coordinator.apply(completion);
                }
                Ok(()) = busy.changed() => {
                    if *busy.borrow_and_update() {
                        eprintln!("loading...");
                    }
                }
            }
        }
        tracing::info!("console closed");
        Ok(())
    }

    async fn handle(&mut self, command: Command) {
        tracing::debug!(?command, "handling command");
        match command {
            Command::Refresh => self.coordinator.trigger_feed_fetch(),
            Command::Focus => {
                self.coordinator.search_activated();
                self.show();
            }
            Command::Search(text) => {
                if !self.coordinator.query_changed(&text) {
                    self.show();
                }
            }
            Command::Cancel => {
                self.coordinator.search_cancelled();
                self.show();
            }
            Command::More => {
                if !self.coordinator.trigger_load_more() {
                    println!("(nothing more to load)");
                }
            }
            Command::Detail(isbn13) => {
                self.coordinator.trigger_detail_fetch(&isbn13);
                let placeholder = &self.renderer.labels.memo_placeholder;
                match memo_or_placeholder(self.memos.as_ref(), &isbn13, placeholder).await {
                    Ok(memo) => println!("  memo:   {}", memo),
                    Err(e) => {
                        tracing::error!(error = ?e, %isbn13, "failed to load memo");
                        eprintln!("! could not read the memo");
                    }
                }
            }
            Command::Memo { isbn13, text } => match self.memos.save(&isbn13, &text).await {
                Ok(()) if text.trim().is_empty() => println!("memo cleared"),
                Ok(()) => println!("memo saved"),
                Err(e) => {
                    tracing::error!(error = ?e, %isbn13, "failed to save memo");
                    eprintln!("! could not save the memo");
                }
            },
            Command::Show => self.show(),
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    fn show(&self) {
        println!("{}", self.renderer.list(self.coordinator.list_view()));
    }
}
