use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use queue_core::menu::{COMMAND_ADD_HOVERED_LINK, MENU_ADD_LINK, MENU_ADD_PAGE};
use queue_core::{CursorPosition, FrameId, MenuClick, TabId};
use queue_engine::{
    ClientSettings, ExtensionRuntime, OrchestratorEvent, OrchestratorSettings, Rect,
    RuntimeCommand, RuntimeDeps, RuntimeEvent, StatusLine,
};
use queue_logging::{queue_info, queue_warn};
use thiserror::Error;

use super::console::{ConsoleBadge, ConsoleNotifier, ConsoleToasts};
use super::logging::{self, LogDestination};
use super::persistence::{FileSettings, SETTINGS_FILENAME};

const TICK: Duration = Duration::from_millis(75);

const HELP: &str = "\
open <url> [html-file]                 open a tab and make it active
frame <tab> <url> [html-file]          embed a frame in a tab
nav <tab> <url> [html-file]            navigate a tab
activate <tab> | close <tab>
place <tab> <frame> <id> <x> <y> <w> <h>  lay out an element
over <tab> <frame> <id>                pointer enters an element
move <tab> <frame> <x> <y>             pointer moves
focus <tab> <frame> <id>               element gains focus
page <tab> <url>                       context menu: add page
link <tab> <page-url> <link-url>       context menu: add link
hover                                  shortcut: add hovered link
popup                                  show the popup's current URL
add [url]                              popup: add current tab or a pasted URL
save <server> [device]                 options: save settings
health [server]                        options: test server health
help | quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0:?} is not a number")]
    NotANumber(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConsoleCommand {
    Runtime(RuntimeCommand),
    /// Tab-level command whose document still has to be read from disk.
    Load {
        kind: LoadKind,
        url: String,
        html_file: Option<PathBuf>,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadKind {
    Open,
    Frame(TabId),
    Navigate(TabId),
}

fn number<T: std::str::FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::NotANumber(raw.to_string()))
}

pub(crate) fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Ok(None);
    };
    let runtime = |command| Ok(Some(ConsoleCommand::Runtime(command)));
    let frame_target = |args: &[&str], usage| -> Result<(TabId, FrameId), CommandError> {
        match args {
            [tab, frame, ..] => Ok((number(tab)?, number(frame)?)),
            _ => Err(CommandError::Usage(usage)),
        }
    };

    match name {
        "open" => match args {
            [url] | [url, _] => Ok(Some(ConsoleCommand::Load {
                kind: LoadKind::Open,
                url: url.to_string(),
                html_file: args.get(1).map(PathBuf::from),
            })),
            _ => Err(CommandError::Usage("open <url> [html-file]")),
        },
        "frame" | "nav" => match args {
            [tab, url] | [tab, url, _] => {
                let tab = number(tab)?;
                let kind = if name == "frame" {
                    LoadKind::Frame(tab)
                } else {
                    LoadKind::Navigate(tab)
                };
                Ok(Some(ConsoleCommand::Load {
                    kind,
                    url: url.to_string(),
                    html_file: args.get(2).map(PathBuf::from),
                }))
            }
            _ => Err(CommandError::Usage("frame|nav <tab> <url> [html-file]")),
        },
        "activate" | "close" => match args {
            [tab] => {
                let tab = number(tab)?;
                runtime(if name == "activate" {
                    RuntimeCommand::Activate(tab)
                } else {
                    RuntimeCommand::CloseTab(tab)
                })
            }
            _ => Err(CommandError::Usage("activate|close <tab>")),
        },
        "place" => {
            const USAGE: &str = "place <tab> <frame> <id> <x> <y> <w> <h>";
            let (tab_id, frame_id) = frame_target(args, USAGE)?;
            match args {
                [_, _, id, x, y, w, h] => runtime(RuntimeCommand::Place {
                    tab_id,
                    frame_id,
                    element_id: id.to_string(),
                    rect: Rect::new(number(x)?, number(y)?, number(w)?, number(h)?),
                }),
                _ => Err(CommandError::Usage(USAGE)),
            }
        }
        "over" | "focus" => {
            const USAGE: &str = "over|focus <tab> <frame> <id>";
            let (tab_id, frame_id) = frame_target(args, USAGE)?;
            let [_, _, id] = args else {
                return Err(CommandError::Usage(USAGE));
            };
            let element_id = id.to_string();
            runtime(if name == "over" {
                RuntimeCommand::PointerOver {
                    tab_id,
                    frame_id,
                    element_id,
                }
            } else {
                RuntimeCommand::Focus {
                    tab_id,
                    frame_id,
                    element_id,
                }
            })
        }
        "move" => {
            const USAGE: &str = "move <tab> <frame> <x> <y>";
            let (tab_id, frame_id) = frame_target(args, USAGE)?;
            let [_, _, x, y] = args else {
                return Err(CommandError::Usage(USAGE));
            };
            runtime(RuntimeCommand::PointerMoved {
                tab_id,
                frame_id,
                position: CursorPosition::new(number(x)?, number(y)?),
            })
        }
        "page" => match args {
            [tab, url] => runtime(RuntimeCommand::MenuClick(MenuClick {
                menu_item_id: MENU_ADD_PAGE.to_string(),
                page_url: Some(url.to_string()),
                link_url: None,
                tab_id: Some(number(tab)?),
            })),
            _ => Err(CommandError::Usage("page <tab> <url>")),
        },
        "link" => match args {
            [tab, page_url, link_url] => runtime(RuntimeCommand::MenuClick(MenuClick {
                menu_item_id: MENU_ADD_LINK.to_string(),
                page_url: Some(page_url.to_string()),
                link_url: Some(link_url.to_string()),
                tab_id: Some(number(tab)?),
            })),
            _ => Err(CommandError::Usage("link <tab> <page-url> <link-url>")),
        },
        "hover" => runtime(RuntimeCommand::Command(COMMAND_ADD_HOVERED_LINK.to_string())),
        "popup" => runtime(RuntimeCommand::PopupOpened),
        "add" => match args {
            [] => runtime(RuntimeCommand::PopupAddCurrent),
            _ => runtime(RuntimeCommand::PopupAddManual(args.join(" "))),
        },
        "save" => match args {
            [server] | [server, _] => runtime(RuntimeCommand::SaveSettings {
                server_base: server.to_string(),
                device_name: args.get(1).map(|d| d.to_string()).unwrap_or_default(),
            }),
            _ => Err(CommandError::Usage("save <server> [device]")),
        },
        "health" => runtime(RuntimeCommand::TestHealth {
            server_base: args.first().map(|s| s.to_string()).unwrap_or_default(),
        }),
        "help" => Ok(Some(ConsoleCommand::Help)),
        "quit" | "exit" => Ok(Some(ConsoleCommand::Quit)),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn load_command(
    kind: LoadKind,
    url: String,
    html_file: Option<PathBuf>,
) -> anyhow::Result<RuntimeCommand> {
    let html = match html_file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => String::new(),
    };
    Ok(match kind {
        LoadKind::Open => RuntimeCommand::OpenTab { url, html },
        LoadKind::Frame(tab_id) => RuntimeCommand::AddFrame { tab_id, url, html },
        LoadKind::Navigate(tab_id) => RuntimeCommand::Navigate { tab_id, url, html },
    })
}

fn print_status(origin: &str, status: &StatusLine) {
    let mark = if status.ok { "ok" } else { "error" };
    println!("[{origin}] {} ({mark})", status.text);
}

fn print_event(event: RuntimeEvent) {
    match event {
        RuntimeEvent::TabOpened(tab_id) => println!("tab {tab_id} opened"),
        RuntimeEvent::FrameAdded { tab_id, frame_id } => {
            println!("frame {frame_id} attached to tab {tab_id}")
        }
        RuntimeEvent::CurrentUrl(url) => println!("[popup] {url}"),
        RuntimeEvent::PopupStatus(status) => print_status("popup", &status),
        RuntimeEvent::OptionsStatus(status) => print_status("options", &status),
        RuntimeEvent::Ignored(what) => println!("ignored {what}"),
        RuntimeEvent::Trigger(OrchestratorEvent::Finished(report)) => {
            let url = report.submitted_url.as_deref().unwrap_or("nothing");
            println!("{} done: {url}", report.kind.label());
        }
        RuntimeEvent::Trigger(OrchestratorEvent::Rejected { kind, busy_with }) => {
            println!("{} dropped, trigger {busy_with} still running", kind.label())
        }
        RuntimeEvent::HostError(err) => println!("error: {err}"),
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::from_env());

    let settings = Arc::new(FileSettings::open(PathBuf::from(".").join(SETTINGS_FILENAME)));
    let current = settings.snapshot();
    queue_info!(
        "Starting with server {} as {}",
        current.server_base,
        current.device_name
    );
    println!(
        "Cosmos Queue console: server {}, device {}. Type `help`.",
        current.server_base, current.device_name
    );

    let runtime = ExtensionRuntime::new(RuntimeDeps {
        settings,
        badge: Arc::new(ConsoleBadge),
        notifier: Arc::new(ConsoleNotifier),
        toast_surface: Arc::new(ConsoleToasts),
        client: ClientSettings::default(),
        orchestrator: OrchestratorSettings::default(),
    })
    .context("starting extension runtime")?;

    let input = spawn_stdin_reader();
    loop {
        match input.recv_timeout(TICK) {
            Ok(line) => match parse_command(&line) {
                Ok(Some(ConsoleCommand::Runtime(command))) => runtime.send(command),
                Ok(Some(ConsoleCommand::Load {
                    kind,
                    url,
                    html_file,
                })) => match load_command(kind, url, html_file) {
                    Ok(command) => runtime.send(command),
                    Err(err) => println!("error: {err:#}"),
                },
                Ok(Some(ConsoleCommand::Help)) => println!("{HELP}"),
                Ok(Some(ConsoleCommand::Quit)) => break,
                Ok(None) => {}
                Err(err) => {
                    queue_warn!("Bad console input {line:?}: {err}");
                    println!("{err}");
                }
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        while let Some(event) = runtime.try_recv() {
            print_event(event);
        }
    }

    runtime.shutdown();
    queue_info!("Console closed");
    Ok(())
}
