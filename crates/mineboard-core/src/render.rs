use std::io::{self, IsTerminal, Write};

use mineboard_client::{Board, EmptyState};
use mineboard_shared::{Category, Task};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.color()?;
        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, board))]
    pub fn print_board(&self, board: &Board) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_board(&mut out, board)
    }

    #[tracing::instrument(skip(self, board))]
    pub fn print_categories(&self, board: &Board) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_categories(&mut out, board)
    }

    pub fn write_board<W: Write>(&self, mut out: W, board: &Board) -> anyhow::Result<()> {
        if board.is_identity_modal_open() {
            writeln!(
                out,
                "{}",
                self.paint("No nickname set. Run `board nick <name>` to join in.", "33")
            )?;
            writeln!(out)?;
        }

        let view = board.view();
        if let Some(category) = board.active_category() {
            writeln!(out, "Category: # {}", category.name)?;
            writeln!(out)?;
        }

        writeln!(out, "{}", self.paint("To do", "1"))?;
        match view.empty {
            Some(EmptyState::NoTasks) => {
                writeln!(out, "No tasks have been created yet. Add the first one!")?;
            }
            Some(EmptyState::CategoryEmpty(category)) => {
                writeln!(out, "The category \"{}\" has no tasks.", category.name)?;
            }
            None => {
                self.write_task_table(&mut out, board, &view.pending)?;
            }
        }

        if !view.completed.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", self.paint("Done", "1"))?;
            self.write_task_table(&mut out, board, &view.completed)?;
        }

        Ok(())
    }

    pub fn write_categories<W: Write>(&self, mut out: W, board: &Board) -> anyhow::Result<()> {
        let active = board.active_category().map(|c| c.id);
        let rows = board
            .categories()
            .iter()
            .map(|category: &Category| {
                let count = board
                    .tasks()
                    .iter()
                    .filter(|task| task.has_category(category.id))
                    .count();
                let name = if Some(category.id) == active {
                    self.paint(&format!("# {}", category.name), "32")
                } else {
                    format!("# {}", category.name)
                };
                vec![category.id.to_string(), name, count.to_string()]
            })
            .collect();

        write_table(
            &mut out,
            vec!["ID".to_string(), "Category".to_string(), "Tasks".to_string()],
            rows,
        )
    }

    fn write_task_table<W: Write>(
        &self,
        out: W,
        board: &Board,
        tasks: &[&Task],
    ) -> anyhow::Result<()> {
        let rows = tasks
            .iter()
            .map(|task| {
                let id = self.paint(&task.id.to_string(), "33");
                let mark = if board.is_assigned(task) { "*" } else { "" };
                let categories = task
                    .categories
                    .iter()
                    .map(|category| format!("#{}", category.name))
                    .collect::<Vec<_>>()
                    .join(" ");
                let players = task
                    .players
                    .iter()
                    .map(|player| player.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    id,
                    mark.to_string(),
                    task.title.clone(),
                    task.created_by.clone(),
                    categories,
                    players,
                ]
            })
            .collect();

        write_table(
            out,
            vec![
                "ID".to_string(),
                "".to_string(),
                "Title".to_string(),
                "Created by".to_string(),
                "Categories".to_string(),
                "Helping".to_string(),
            ],
            rows,
        )
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use mineboard_client::CallOutcome;
    use mineboard_shared::Player;

    use super::*;

    fn board_with(tasks: Vec<Task>, nickname: Option<&str>) -> Board {
        let mut board = Board::new(vec![
            Category {
                id: 1,
                name: "Construção".to_string(),
            },
            Category {
                id: 2,
                name: "Exploração".to_string(),
            },
        ]);
        let ticket = board.start(nickname.map(str::to_string)).expect("start");
        board.settle(ticket, CallOutcome::Fetched(Ok(tasks)));
        board
    }

    fn render(board: &Board) -> String {
        let mut buf = Vec::new();
        Renderer::plain().write_board(&mut buf, board).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn empty_board_explains_itself() {
        let out = render(&board_with(vec![], None));
        assert!(out.contains("No nickname set"));
        assert!(out.contains("No tasks have been created yet"));
        assert!(!out.contains("Done"));
    }

    #[test]
    fn sections_and_assignment_marker() {
        let tasks = vec![
            Task {
                id: 1,
                title: "Build wall".to_string(),
                completed: false,
                created_by: "Steve".to_string(),
                categories: vec![],
                players: vec![Player {
                    name: "Steve".to_string(),
                }],
            },
            Task {
                id: 2,
                title: "Find diamonds".to_string(),
                completed: true,
                created_by: "Alex".to_string(),
                categories: vec![],
                players: vec![],
            },
        ];
        let out = render(&board_with(tasks, Some("Steve")));

        let todo = out.find("To do").expect("to do section");
        let done = out.find("Done").expect("done section");
        assert!(todo < done);
        assert!(out[todo..done].contains("Build wall"));
        assert!(out[done..].contains("Find diamonds"));
        assert!(out.lines().any(|line| line.starts_with("1  *")));
        assert!(!out.contains("No nickname set"));
    }

    #[test]
    fn empty_category_is_named() {
        let mut board = board_with(
            vec![Task {
                id: 1,
                title: "Build wall".to_string(),
                completed: false,
                created_by: "Steve".to_string(),
                categories: vec![],
                players: vec![],
            }],
            Some("Steve"),
        );
        board.set_active_category(2);
        let out = render(&board);
        assert!(out.contains("The category \"Exploração\" has no tasks."));
    }

    #[test]
    fn strip_ansi_keeps_visible_text() {
        assert_eq!(strip_ansi("\x1b[33m12\x1b[0m"), "12");
    }
}
