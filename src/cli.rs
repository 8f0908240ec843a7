use crate::error::AppError;
use gallery_api::{AccessRequestStatus, Role};
use media_gallery::{MediaSort, MediaType, SocialPlatform, Visibility};
use pico_args::Arguments;
use std::ffi::OsString;
use std::path::PathBuf;

pub const USAGE: &str = "\
family-gallery - command line client for the family gallery

USAGE:
  family-gallery [--config FILE] [--json] <COMMAND> [ARGS]

ACCOUNT:
  login <username> [--password PW] [--request-access]
  logout
  whoami
  request-access <username> --password PW [--message TEXT]
  view-role <developer|manager|viewer>

BROWSING:
  category <key> [--page N] [--size N] [--type image|video|all]
  albums list [--visibility V]
  albums show <id>
  albums create <title> [--visibility V]
  albums update <id> [--title T] [--visibility V] [--cover MEDIA_ID]
  albums delete <id>
  sections list
  sections create <title> [--key K] [--rows 1|2]
  sections update <id> [--title T] [--key K] [--rows 1|2]
  sections delete <id>
  sections set-albums <id> <album_id>...
  sections reorder <section_id>...
  media list [--album ID] [--type T] [--q TEXT] [--page N] [--size N] [--sort created_at|taken_at]
  media show <id>
  media update <id> [--title T] [--album ID] [--taken-at ISO]
  media delete <id>
  media tags <id> [tag]...
  media upload <file>... [--album ID] [--taken-at ISO] [--title T]
  media url <id> [--preview]
  tags list
  tags create <name>
  social list [--platform x|instagram|all] [--limit N] [--cursor C] [--pages N]
  social show <id>

CONTROL CENTER:
  accounts list
  accounts role <user_id> <viewer|manager>
  requests list [--status pending|approved|rejected]
  requests approve <id> [--note TEXT]
  requests reject <id> [--note TEXT]

OPTIONS:
  --config FILE   Configuration file (default: ./gallery.toml)
  --json          Print results as JSON
  -h, --help      Print this help
";

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Login {
        username: String,
        password: Option<String>,
        /// Ask for a viewer account when the credentials are refused
        request_access: bool,
    },
    Logout,
    Whoami,
    RequestAccess {
        username: String,
        password: String,
        message: Option<String>,
    },
    ViewRole(Role),
    Category {
        key: String,
        page: u32,
        size: Option<u32>,
        media_type: Option<MediaType>,
    },
    Albums(AlbumCommand),
    Sections(SectionCommand),
    Media(MediaCommand),
    Tags(TagCommand),
    Social(SocialCommand),
    Accounts(AccountCommand),
    Requests(RequestCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlbumCommand {
    List {
        visibility: Option<Visibility>,
    },
    Show {
        id: i64,
    },
    Create {
        title: String,
        visibility: Option<Visibility>,
    },
    Update {
        id: i64,
        title: Option<String>,
        visibility: Option<Visibility>,
        cover_media_id: Option<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionCommand {
    List,
    Create {
        title: String,
        key: Option<String>,
        preview_rows: Option<u8>,
    },
    Update {
        id: i64,
        title: Option<String>,
        key: Option<String>,
        preview_rows: Option<u8>,
    },
    Delete {
        id: i64,
    },
    SetAlbums {
        id: i64,
        album_ids: Vec<i64>,
    },
    Reorder {
        order: Vec<i64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    List {
        album_id: Option<i64>,
        media_type: Option<MediaType>,
        search: Option<String>,
        page: u32,
        size: Option<u32>,
        sort: MediaSort,
    },
    Show {
        id: i64,
    },
    Update {
        id: i64,
        title: Option<String>,
        album_id: Option<i64>,
        taken_at: Option<String>,
    },
    Delete {
        id: i64,
    },
    Tags {
        id: i64,
        tags: Vec<String>,
    },
    Upload {
        files: Vec<PathBuf>,
        album_id: Option<i64>,
        taken_at: Option<String>,
        title: Option<String>,
    },
    Url {
        id: i64,
        preview: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagCommand {
    List,
    Create { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocialCommand {
    List {
        platform: Option<SocialPlatform>,
        limit: Option<u32>,
        cursor: Option<String>,
        pages: usize,
    },
    Show {
        id: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountCommand {
    List,
    Role { id: i64, role: Role },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestCommand {
    List {
        status: Option<AccessRequestStatus>,
    },
    Approve {
        id: i64,
        note: Option<String>,
    },
    Reject {
        id: i64,
        note: Option<String>,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| format!("Unknown role: {}", value))
}

fn parse_visibility(value: &str) -> Result<Visibility, String> {
    Visibility::parse(value).ok_or_else(|| format!("Unknown visibility: {}", value))
}

fn parse_sort(value: &str) -> Result<MediaSort, String> {
    match value.trim() {
        "created_at" => Ok(MediaSort::CreatedAt),
        "taken_at" => Ok(MediaSort::TakenAt),
        other => Err(format!("Unknown sort: {}", other)),
    }
}

fn parse_status(value: &str) -> Result<AccessRequestStatus, String> {
    match value.trim().to_lowercase().as_str() {
        "pending" => Ok(AccessRequestStatus::Pending),
        "approved" => Ok(AccessRequestStatus::Approved),
        "rejected" => Ok(AccessRequestStatus::Rejected),
        other => Err(format!("Unknown status: {}", other)),
    }
}

fn media_type_option(args: &mut Arguments) -> Result<Option<MediaType>, AppError> {
    Ok(args
        .opt_value_from_fn("--type", MediaType::parse_filter)?
        .flatten())
}

fn remaining(args: Arguments) -> Vec<String> {
    args.finish()
        .into_iter()
        .map(|s| s.to_string_lossy().into_owned())
        .collect()
}

fn no_more(args: Arguments) -> Result<(), AppError> {
    let rest = remaining(args);
    if !rest.is_empty() {
        return Err(AppError::Validation(format!(
            "Unexpected arguments: {}",
            rest.join(" ")
        )));
    }
    Ok(())
}

fn parse_ids(values: Vec<String>) -> Result<Vec<i64>, AppError> {
    values
        .iter()
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| AppError::Validation(format!("Not an id: {}", v)))
        })
        .collect()
}

fn missing_action(command: &str) -> AppError {
    AppError::Validation(format!("'{}' needs an action, see --help", command))
}

fn unknown_action(command: &str, action: &str) -> AppError {
    AppError::Validation(format!("Unknown action '{} {}'", command, action))
}

/// Parses the process arguments
pub fn parse(mut args: Arguments) -> Result<Cli, AppError> {
    if args.contains(["-h", "--help"]) {
        return Ok(Cli {
            config: None,
            json: false,
            command: Command::Help,
        });
    }

    let config: Option<PathBuf> = args.opt_value_from_str("--config")?;
    let json = args.contains("--json");

    let command = match args.subcommand()?.as_deref() {
        None | Some("help") => Command::Help,
        Some("login") => {
            let password = args.opt_value_from_str("--password")?;
            let request_access = args.contains("--request-access");
            let username = args.free_from_str()?;
            no_more(args)?;
            Command::Login {
                username,
                password,
                request_access,
            }
        }
        Some("logout") => {
            no_more(args)?;
            Command::Logout
        }
        Some("whoami") => {
            no_more(args)?;
            Command::Whoami
        }
        Some("request-access") => {
            let password = args.value_from_str("--password")?;
            let message = args.opt_value_from_str("--message")?;
            let username = args.free_from_str()?;
            no_more(args)?;
            Command::RequestAccess {
                username,
                password,
                message,
            }
        }
        Some("view-role") => {
            let role = args.free_from_fn(parse_role)?;
            no_more(args)?;
            Command::ViewRole(role)
        }
        Some("category") => {
            let page = args.opt_value_from_str("--page")?.unwrap_or(1);
            let size = args.opt_value_from_str("--size")?;
            let media_type = media_type_option(&mut args)?;
            let key = args.free_from_str()?;
            no_more(args)?;
            Command::Category {
                key,
                page,
                size,
                media_type,
            }
        }
        Some("albums") => Command::Albums(parse_albums(args)?),
        Some("sections") => Command::Sections(parse_sections(args)?),
        Some("media") => Command::Media(parse_media(args)?),
        Some("tags") => Command::Tags(parse_tags(args)?),
        Some("social") => Command::Social(parse_social(args)?),
        Some("accounts") => Command::Accounts(parse_accounts(args)?),
        Some("requests") => Command::Requests(parse_requests(args)?),
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unknown command '{}', see --help",
                other
            )))
        }
    };

    Ok(Cli {
        config,
        json,
        command,
    })
}

fn parse_albums(mut args: Arguments) -> Result<AlbumCommand, AppError> {
    let action = args.subcommand()?.ok_or_else(|| missing_action("albums"))?;
    let command = match action.as_str() {
        "list" => AlbumCommand::List {
            visibility: args.opt_value_from_fn("--visibility", parse_visibility)?,
        },
        "show" => AlbumCommand::Show {
            id: args.free_from_str()?,
        },
        "create" => {
            let visibility = args.opt_value_from_fn("--visibility", parse_visibility)?;
            let title = args.free_from_str()?;
            AlbumCommand::Create { title, visibility }
        }
        "update" => {
            let title = args.opt_value_from_str("--title")?;
            let visibility = args.opt_value_from_fn("--visibility", parse_visibility)?;
            let cover_media_id = args.opt_value_from_str("--cover")?;
            let id = args.free_from_str()?;
            AlbumCommand::Update {
                id,
                title,
                visibility,
                cover_media_id,
            }
        }
        "delete" => AlbumCommand::Delete {
            id: args.free_from_str()?,
        },
        other => return Err(unknown_action("albums", other)),
    };
    no_more(args)?;
    Ok(command)
}

fn parse_sections(mut args: Arguments) -> Result<SectionCommand, AppError> {
    let action = args
        .subcommand()?
        .ok_or_else(|| missing_action("sections"))?;
    let command = match action.as_str() {
        "list" => SectionCommand::List,
        "create" => {
            let key = args.opt_value_from_str("--key")?;
            let preview_rows = args.opt_value_from_str("--rows")?;
            let title = args.free_from_str()?;
            SectionCommand::Create {
                title,
                key,
                preview_rows,
            }
        }
        "update" => {
            let title = args.opt_value_from_str("--title")?;
            let key = args.opt_value_from_str("--key")?;
            let preview_rows = args.opt_value_from_str("--rows")?;
            let id = args.free_from_str()?;
            SectionCommand::Update {
                id,
                title,
                key,
                preview_rows,
            }
        }
        "delete" => SectionCommand::Delete {
            id: args.free_from_str()?,
        },
        "set-albums" => {
            let id = args.free_from_str()?;
            let album_ids = parse_ids(remaining(args))?;
            return Ok(SectionCommand::SetAlbums { id, album_ids });
        }
        "reorder" => {
            let order = parse_ids(remaining(args))?;
            return Ok(SectionCommand::Reorder { order });
        }
        other => return Err(unknown_action("sections", other)),
    };
    no_more(args)?;
    Ok(command)
}

fn parse_media(mut args: Arguments) -> Result<MediaCommand, AppError> {
    let action = args.subcommand()?.ok_or_else(|| missing_action("media"))?;
    let command = match action.as_str() {
        "list" => MediaCommand::List {
            album_id: args.opt_value_from_str("--album")?,
            media_type: media_type_option(&mut args)?,
            search: args.opt_value_from_str("--q")?,
            page: args.opt_value_from_str("--page")?.unwrap_or(1),
            size: args.opt_value_from_str("--size")?,
            sort: args
                .opt_value_from_fn("--sort", parse_sort)?
                .unwrap_or_default(),
        },
        "show" => MediaCommand::Show {
            id: args.free_from_str()?,
        },
        "update" => {
            let title = args.opt_value_from_str("--title")?;
            let album_id = args.opt_value_from_str("--album")?;
            let taken_at = args.opt_value_from_str("--taken-at")?;
            let id = args.free_from_str()?;
            MediaCommand::Update {
                id,
                title,
                album_id,
                taken_at,
            }
        }
        "delete" => MediaCommand::Delete {
            id: args.free_from_str()?,
        },
        "tags" => {
            let id = args.free_from_str()?;
            let tags = remaining(args);
            return Ok(MediaCommand::Tags { id, tags });
        }
        "upload" => {
            let album_id = args.opt_value_from_str("--album")?;
            let taken_at = args.opt_value_from_str("--taken-at")?;
            let title = args.opt_value_from_str("--title")?;
            let files: Vec<PathBuf> = args.finish().into_iter().map(PathBuf::from).collect();
            return Ok(MediaCommand::Upload {
                files,
                album_id,
                taken_at,
                title,
            });
        }
        "url" => {
            let preview = args.contains("--preview");
            let id = args.free_from_str()?;
            MediaCommand::Url { id, preview }
        }
        other => return Err(unknown_action("media", other)),
    };
    no_more(args)?;
    Ok(command)
}

fn parse_tags(mut args: Arguments) -> Result<TagCommand, AppError> {
    let action = args.subcommand()?.ok_or_else(|| missing_action("tags"))?;
    let command = match action.as_str() {
        "list" => TagCommand::List,
        "create" => TagCommand::Create {
            name: args.free_from_str()?,
        },
        other => return Err(unknown_action("tags", other)),
    };
    no_more(args)?;
    Ok(command)
}

fn parse_social(mut args: Arguments) -> Result<SocialCommand, AppError> {
    let action = args.subcommand()?.ok_or_else(|| missing_action("social"))?;
    let command = match action.as_str() {
        "list" => SocialCommand::List {
            platform: args
                .opt_value_from_fn("--platform", SocialPlatform::parse_filter)?
                .flatten(),
            limit: args.opt_value_from_str("--limit")?,
            cursor: args.opt_value_from_str("--cursor")?,
            pages: args.opt_value_from_str("--pages")?.unwrap_or(1),
        },
        "show" => SocialCommand::Show {
            id: args.free_from_str()?,
        },
        other => return Err(unknown_action("social", other)),
    };
    no_more(args)?;
    Ok(command)
}

fn parse_accounts(mut args: Arguments) -> Result<AccountCommand, AppError> {
    let action = args
        .subcommand()?
        .ok_or_else(|| missing_action("accounts"))?;
    let command = match action.as_str() {
        "list" => AccountCommand::List,
        "role" => {
            let id = args.free_from_str()?;
            let role = args.free_from_fn(parse_role)?;
            AccountCommand::Role { id, role }
        }
        other => return Err(unknown_action("accounts", other)),
    };
    no_more(args)?;
    Ok(command)
}

fn parse_requests(mut args: Arguments) -> Result<RequestCommand, AppError> {
    let action = args
        .subcommand()?
        .ok_or_else(|| missing_action("requests"))?;
    let command = match action.as_str() {
        "list" => RequestCommand::List {
            status: args.opt_value_from_fn("--status", parse_status)?,
        },
        "approve" => {
            let note = args.opt_value_from_str("--note")?;
            RequestCommand::Approve {
                id: args.free_from_str()?,
                note,
            }
        }
        "reject" => {
            let note = args.opt_value_from_str("--note")?;
            RequestCommand::Reject {
                id: args.free_from_str()?,
                note,
            }
        }
        other => return Err(unknown_action("requests", other)),
    };
    no_more(args)?;
    Ok(command)
}

/// Parses an explicit argument list (without the program name)
pub fn parse_from<I, S>(args: I) -> Result<Cli, AppError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    parse(Arguments::from_vec(args.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_shows_help() {
        let cli = parse_from(Vec::<String>::new()).unwrap();
        assert_eq!(cli.command, Command::Help);
    }

    #[test]
    fn test_global_flags() {
        let cli = parse_from(["--json", "--config", "my.toml", "whoami"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert_eq!(cli.command, Command::Whoami);
    }

    #[test]
    fn test_login_access_request_flag() {
        let cli = parse_from(["login", "alice", "--password", "pw"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Login {
                username: "alice".to_string(),
                password: Some("pw".to_string()),
                request_access: false,
            }
        );

        let cli = parse_from(["login", "--request-access", "alice"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Login {
                request_access: true,
                password: None,
                ..
            }
        ));
    }

    #[test]
    fn test_category_defaults() {
        let cli = parse_from(["category", "family"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Category {
                key: "family".to_string(),
                page: 1,
                size: None,
                media_type: None,
            }
        );

        let cli = parse_from(["category", "trips", "--page", "3", "--type", "video"]).unwrap();
        match cli.command {
            Command::Category {
                page, media_type, ..
            } => {
                assert_eq!(page, 3);
                assert_eq!(media_type, Some(MediaType::Video));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_type_all_means_no_filter() {
        let cli = parse_from(["media", "list", "--type", "all", "--sort", "taken_at"]).unwrap();
        match cli.command {
            Command::Media(MediaCommand::List {
                media_type, sort, ..
            }) => {
                assert_eq!(media_type, None);
                assert_eq!(sort, MediaSort::TakenAt);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_section_album_ids() {
        let cli = parse_from(["sections", "set-albums", "4", "9", "2", "9"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Sections(SectionCommand::SetAlbums {
                id: 4,
                album_ids: vec![9, 2, 9],
            })
        );
        assert!(parse_from(["sections", "reorder", "1", "x"]).is_err());
    }

    #[test]
    fn test_upload_collects_files() {
        let cli = parse_from(["media", "upload", "a.jpg", "b.mp4", "--album", "3"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Media(MediaCommand::Upload {
                files: vec![PathBuf::from("a.jpg"), PathBuf::from("b.mp4")],
                album_id: Some(3),
                taken_at: None,
                title: None,
            })
        );
    }

    #[test]
    fn test_request_decisions() {
        let cli = parse_from(["requests", "reject", "12", "--note", "unknown"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Requests(RequestCommand::Reject {
                id: 12,
                note: Some("unknown".to_string()),
            })
        );
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        assert!(parse_from(["view-role", "admin"]).is_err());
        assert!(parse_from(["albums"]).is_err());
        assert!(parse_from(["albums", "rename", "1"]).is_err());
        assert!(parse_from(["whoami", "extra"]).is_err());
        assert!(parse_from(["frobnicate"]).is_err());
    }
}
