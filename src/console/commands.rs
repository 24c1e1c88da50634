use std::str::FromStr;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pull-to-refresh of the new-books feed.
    Refresh,
    /// Search input gained focus.
    Focus,
    /// Full text of the search input after an edit.
    Search(String),
    Cancel,
    /// Scrolled to the end of the list.
    More,
    Detail(String),
    /// End of a memo edit; no text clears the memo.
    Memo { isbn13: String, text: String },
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.trim_start().split_once(' ') {
            Some((word, rest)) => (word, rest),
            None => (line.trim(), ""),
        };
        match word {
            "new" | "refresh" => Ok(Command::Refresh),
            "focus" => Ok(Command::Focus),
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "cancel" => Ok(Command::Cancel),
            "more" | "m" => Ok(Command::More),
            "detail" | "d" => match rest.trim() {
                "" => Err("usage: detail <isbn13>".into()),
                isbn13 => Ok(Command::Detail(isbn13.to_string())),
            },
            "memo" => {
                let rest = rest.trim_start();
                let (isbn13, text) = rest.split_once(' ').unwrap_or((rest, ""));
                if isbn13.is_empty() {
                    return Err("usage: memo <isbn13> [text]".into());
                }
                Ok(Command::Memo {
                    isbn13: isbn13.to_string(),
                    text: text.to_string(),
                })
            }
            "show" | "" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}

pub const HELP: &str = "\
commands:
  new | refresh          reload the new-books feed
  focus                  activate the search input
  search <text>          set the search text (empty text clears it)
  cancel                 dismiss the search and go back to new books
  more                   load the next page of results
  detail <isbn13>        show a book and its memo
  memo <isbn13> [text]   save a memo (no text clears it)
  show                   print the current list
  quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_keeps_inner_spaces() {
        assert_eq!(
            "search rust in action".parse(),
            Ok(Command::Search("rust in action".into()))
        );
        assert_eq!("search".parse(), Ok(Command::Search(String::new())));
        assert_eq!("search ".parse(), Ok(Command::Search(String::new())));
    }

    #[test]
    fn memo_without_text_clears() {
        assert_eq!(
            "memo 9781617294136".parse(),
            Ok(Command::Memo {
                isbn13: "9781617294136".into(),
                text: String::new()
            })
        );
        assert_eq!(
            "memo 9781617294136 lend to Mina\n".parse(),
            Ok(Command::Memo {
                isbn13: "9781617294136".into(),
                text: "lend to Mina".into()
            })
        );
        assert!("memo".parse::<Command>().is_err());
    }

    #[test]
    fn detail_requires_isbn() {
        assert!("detail".parse::<Command>().is_err());
        assert_eq!(
            "d 9781617294136".parse(),
            Ok(Command::Detail("9781617294136".into()))
        );
    }

    #[test]
    fn blank_line_shows_and_unknown_is_error() {
        assert_eq!("".parse(), Ok(Command::Show));
        assert_eq!("  ".parse(), Ok(Command::Show));
        assert!("launch".parse::<Command>().is_err());
    }
}
