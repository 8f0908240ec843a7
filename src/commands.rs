use crate::cli::{
    AccountCommand, AlbumCommand, Cli, Command, MediaCommand, RequestCommand, SectionCommand,
    SocialCommand, TagCommand, USAGE,
};
use crate::config::GalleryConfig;
use crate::database;
use crate::error::AppError;
use crate::services::album_service::{self, AlbumUpdate};
use crate::services::control_service::{self, Decision};
use crate::services::media_service::{self, MediaUpdate, UploadRequest};
use crate::services::section_service::{self, SectionInput};
use crate::services::social_service::{self, FeedQuery};
use crate::services::session_service::{self, LoginOutcome};
use crate::services::{category_service, tag_service};
use gallery_api::{ApiClient, User};
use media_gallery::{MediaItem, MediaQuery, SocialPost};
use rusqlite::Connection;
use serde::Serialize;
use std::io::BufRead;

/// Prints `value` as JSON or through the text formatter
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

fn done(json: bool, message: &str) -> Result<(), AppError> {
    emit(json, &serde_json::json!({ "ok": true, "message": message }), |_| {
        println!("{}", message)
    })
}

fn describe_user(user: &User) {
    let viewing = user.effective_role();
    if viewing != user.role {
        println!("{} ({}, viewing as {})", user.username, user.role, viewing);
    } else {
        println!("{} ({})", user.username, user.role);
    }
}

fn print_media_items(items: &[MediaItem]) {
    for item in items {
        println!(
            "{:>8}  {:<5}  {:<20}  {}",
            item.id,
            item.media_type,
            item.created_at.as_deref().unwrap_or("-"),
            item.display_name()
        );
    }
}

fn print_posts(posts: &[SocialPost]) {
    for post in posts {
        let pin = if post.is_pinned { "*" } else { " " };
        let first_line = post.content.lines().next().unwrap_or("");
        println!(
            "{}{:>6}  {:<9}  @{:<16}  {}",
            pin,
            post.id,
            post.platform.as_str(),
            post.author_handle,
            first_line
        );
    }
}

fn read_password() -> Result<String, AppError> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Runs one parsed command line
pub async fn run(cli: Cli) -> Result<(), AppError> {
    if cli.command == Command::Help {
        print!("{}", USAGE);
        return Ok(());
    }

    let config = GalleryConfig::load(cli.config.as_deref())?;
    let conn = database::init_database(&config.database_path)?;
    let client = session_service::connect(&conn, &config)?;
    log::debug!("Using gallery server {}", client.base_url());

    dispatch(&conn, &client, &config, cli.json, cli.command).await
}

async fn dispatch(
    conn: &Connection,
    client: &ApiClient,
    config: &GalleryConfig,
    json: bool,
    command: Command,
) -> Result<(), AppError> {
    match command {
        Command::Help => {
            print!("{}", USAGE);
            Ok(())
        }
        Command::Login {
            username,
            password,
            request_access,
        } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            if !request_access {
                let user = session_service::login(conn, client, &username, &password).await?;
                return emit(json, &user, |u| {
                    print!("Signed in as ");
                    describe_user(u);
                });
            }

            let outcome =
                session_service::login_or_request_access(conn, client, &username, &password)
                    .await?;
            emit(json, &outcome, |outcome| match outcome {
                LoginOutcome::SignedIn(user) => {
                    print!("Signed in as ");
                    describe_user(user);
                }
                LoginOutcome::AccessRequested(r) => println!(
                    "Sign-in refused. Access request {} for {} was submitted and is {:?}.",
                    r.id, r.username, r.status
                ),
            })
        }
        Command::Logout => {
            session_service::logout(conn, client).await?;
            done(json, "Signed out")
        }
        Command::Whoami => {
            let user = session_service::current_user(conn, client).await?;
            emit(json, &user, |u| match u {
                Some(u) => describe_user(u),
                None => println!("Not signed in"),
            })
        }
        Command::RequestAccess {
            username,
            password,
            message,
        } => {
            let request =
                session_service::request_access(client, &username, &password, message.as_deref())
                    .await?;
            emit(json, &request, |r| {
                println!("Request {} for {} is {:?}", r.id, r.username, r.status)
            })
        }
        Command::ViewRole(role) => {
            let user = session_service::set_view_role(conn, client, role).await?;
            emit(json, &user, describe_user)
        }
        Command::Category {
            key,
            page,
            size,
            media_type,
        } => {
            session_service::require_user(conn, client).await?;
            let size = size.unwrap_or(config.page_size);
            let result =
                category_service::browse_category(client, &key, page, size, media_type).await?;
            emit(json, &result, |p| {
                println!(
                    "{}: page {} of {} ({} items)",
                    p.title, p.page, p.total_pages, p.total
                );
                print_media_items(&p.items);
            })
        }
        Command::Albums(command) => run_albums(conn, client, json, command).await,
        Command::Sections(command) => run_sections(conn, client, json, command).await,
        Command::Media(command) => run_media(conn, client, config, json, command).await,
        Command::Tags(command) => run_tags(conn, client, json, command).await,
        Command::Social(command) => run_social(conn, client, json, command).await,
        Command::Accounts(command) => run_accounts(conn, client, json, command).await,
        Command::Requests(command) => run_requests(conn, client, json, command).await,
    }
}

async fn run_albums(
    conn: &Connection,
    client: &ApiClient,
    json: bool,
    command: AlbumCommand,
) -> Result<(), AppError> {
    match command {
        AlbumCommand::List { visibility } => {
            session_service::require_user(conn, client).await?;
            let albums = album_service::list_albums(client, visibility).await?;
            emit(json, &albums, |albums| {
                for album in albums {
                    println!(
                        "{:>6}  {:<8}  {:>5}  {}",
                        album.id,
                        album.visibility.as_str(),
                        album.media_count.unwrap_or(0),
                        album.title
                    );
                }
            })
        }
        AlbumCommand::Show { id } => {
            session_service::require_user(conn, client).await?;
            let album = album_service::get_album(client, id).await?;
            emit(json, &album, |a| {
                println!("{} ({})", a.title, a.visibility.as_str());
                println!("  items: {}", a.media_count.unwrap_or(0));
                if let Some(cover) = a.cover_id() {
                    println!("  cover: {}", media_service::preview_url(client, cover));
                }
            })
        }
        AlbumCommand::Create { title, visibility } => {
            session_service::require_developer(conn, client).await?;
            let album = album_service::create_album(client, &title, visibility).await?;
            emit(json, &album, |a| println!("Created album {} ({})", a.id, a.title))
        }
        AlbumCommand::Update {
            id,
            title,
            visibility,
            cover_media_id,
        } => {
            session_service::require_developer(conn, client).await?;
            let update = AlbumUpdate {
                title,
                visibility,
                cover_media_id,
            };
            let album = album_service::update_album(client, id, update).await?;
            emit(json, &album, |a| println!("Updated album {} ({})", a.id, a.title))
        }
        AlbumCommand::Delete { id } => {
            session_service::require_developer(conn, client).await?;
            album_service::delete_album(client, id).await?;
            done(json, &format!("Deleted album {}", id))
        }
    }
}

async fn run_sections(
    conn: &Connection,
    client: &ApiClient,
    json: bool,
    command: SectionCommand,
) -> Result<(), AppError> {
    if command == SectionCommand::List {
        session_service::require_user(conn, client).await?;
        let sections = section_service::list_sections(client).await?;
        return emit(json, &sections, |sections| {
            for s in sections {
                println!(
                    "{:>4}  {:<20}  {}  albums: {:?}",
                    s.id, s.key, s.title, s.album_ids
                );
            }
        });
    }

    session_service::require_developer(conn, client).await?;
    match command {
        SectionCommand::List => Ok(()),
        SectionCommand::Create {
            title,
            key,
            preview_rows,
        } => {
            let input = SectionInput {
                title: Some(title),
                key,
                preview_rows,
            };
            let section = section_service::create_section(client, input).await?;
            emit(json, &section, |s| {
                println!("Created section {} ({})", s.id, s.key)
            })
        }
        SectionCommand::Update {
            id,
            title,
            key,
            preview_rows,
        } => {
            let input = SectionInput {
                title,
                key,
                preview_rows,
            };
            let section = section_service::update_section(client, id, input).await?;
            emit(json, &section, |s| {
                println!("Updated section {} ({})", s.id, s.key)
            })
        }
        SectionCommand::Delete { id } => {
            section_service::delete_section(client, id).await?;
            done(json, &format!("Deleted section {}", id))
        }
        SectionCommand::SetAlbums { id, album_ids } => {
            let section = section_service::set_section_albums(client, id, &album_ids).await?;
            emit(json, &section, |s| {
                println!("Section {} albums: {:?}", s.key, s.album_ids)
            })
        }
        SectionCommand::Reorder { order } => {
            section_service::reorder_sections(client, &order).await?;
            done(json, "Sections reordered")
        }
    }
}

async fn run_media(
    conn: &Connection,
    client: &ApiClient,
    config: &GalleryConfig,
    json: bool,
    command: MediaCommand,
) -> Result<(), AppError> {
    match command {
        MediaCommand::List {
            album_id,
            media_type,
            search,
            page,
            size,
            sort,
        } => {
            session_service::require_user(conn, client).await?;
            let query = MediaQuery {
                album_id,
                media_type,
                search,
                page,
                size: size.unwrap_or(config.page_size),
                sort,
            };
            let result = media_service::list_media(client, &query).await?;
            emit(json, &result, |p| {
                println!("{} items", p.total);
                print_media_items(&p.items);
            })
        }
        MediaCommand::Show { id } => {
            session_service::require_user(conn, client).await?;
            let detail = media_service::get_media(client, id).await?;
            emit(json, &detail, |d| {
                println!("{} ({})", d.item.display_name(), d.item.media_type);
                if let (Some(w), Some(h)) = (d.width, d.height) {
                    println!("  size:     {}x{}", w, h);
                }
                if let Some(taken) = d.item.taken_at.as_deref() {
                    println!("  taken at: {}", taken);
                }
                if !d.tags.is_empty() {
                    println!("  tags:     {}", d.tags.join(", "));
                }
                println!("  file:     {}", media_service::file_url(client, d.item.id));
            })
        }
        MediaCommand::Update {
            id,
            title,
            album_id,
            taken_at,
        } => {
            session_service::require_manager(conn, client).await?;
            let update = MediaUpdate {
                title,
                album_id,
                taken_at,
            };
            let detail = media_service::update_media(client, id, update).await?;
            emit(json, &detail, |d| println!("Updated media {}", d.item.id))
        }
        MediaCommand::Delete { id } => {
            session_service::require_manager(conn, client).await?;
            media_service::delete_media(client, id).await?;
            done(json, &format!("Deleted media {}", id))
        }
        MediaCommand::Tags { id, tags } => {
            session_service::require_manager(conn, client).await?;
            let stored = media_service::set_media_tags(client, id, &tags).await?;
            emit(json, &stored, |t| println!("Tags: {}", t.join(", ")))
        }
        MediaCommand::Upload {
            files,
            album_id,
            taken_at,
            title,
        } => {
            session_service::require_manager(conn, client).await?;
            let request = UploadRequest {
                files,
                album_id,
                taken_at,
                title,
            };
            let created = media_service::upload_media(client, request).await?;
            emit(json, &created, |items| print_media_items(items))
        }
        MediaCommand::Url { id, preview } => {
            let url = if preview {
                media_service::preview_url(client, id)
            } else {
                media_service::file_url(client, id)
            };
            emit(json, &url, |u| println!("{}", u))
        }
    }
}

async fn run_tags(
    conn: &Connection,
    client: &ApiClient,
    json: bool,
    command: TagCommand,
) -> Result<(), AppError> {
    match command {
        TagCommand::List => {
            session_service::require_user(conn, client).await?;
            let tags = tag_service::list_tags(client).await?;
            emit(json, &tags, |tags| {
                for tag in tags {
                    println!("{:>5}  {}", tag.id, tag.name);
                }
            })
        }
        TagCommand::Create { name } => {
            session_service::require_developer(conn, client).await?;
            let tag = tag_service::create_tag(client, &name).await?;
            emit(json, &tag, |t| println!("Created tag {} ({})", t.name, t.id))
        }
    }
}

async fn run_social(
    conn: &Connection,
    client: &ApiClient,
    json: bool,
    command: SocialCommand,
) -> Result<(), AppError> {
    session_service::require_user(conn, client).await?;
    match command {
        SocialCommand::List {
            platform,
            limit,
            cursor,
            pages,
        } => {
            let query = FeedQuery {
                platform,
                limit: limit.unwrap_or(social_service::DEFAULT_FEED_LIMIT),
                cursor,
            };
            if pages <= 1 {
                let page = social_service::list_posts(client, &query).await?;
                emit(json, &page, |p| {
                    print_posts(&p.items);
                    if let Some(cursor) = p.next_cursor.as_deref().filter(|_| p.has_more) {
                        println!("next: --cursor '{}'", cursor);
                    }
                })
            } else {
                let posts = social_service::collect_posts(client, query, pages).await?;
                emit(json, &posts, |posts| print_posts(posts))
            }
        }
        SocialCommand::Show { id } => {
            let detail = social_service::get_post(client, id).await?;
            emit(json, &detail, |d| {
                print_posts(std::slice::from_ref(&d.post));
                println!();
                println!("{}", d.post.content);
                for reply in &d.replies {
                    println!("  @{}: {}", reply.author_handle, reply.content);
                }
            })
        }
    }
}

async fn run_accounts(
    conn: &Connection,
    client: &ApiClient,
    json: bool,
    command: AccountCommand,
) -> Result<(), AppError> {
    session_service::require_developer(conn, client).await?;
    match command {
        AccountCommand::List => {
            let accounts = control_service::list_accounts(client).await?;
            emit(json, &accounts, |accounts| {
                for a in accounts {
                    println!("{:>5}  {:<9}  {}", a.id, a.role, a.username);
                }
            })
        }
        AccountCommand::Role { id, role } => {
            let account = control_service::update_account_role(client, id, role).await?;
            emit(json, &account, |a| println!("{} is now {}", a.username, a.role))
        }
    }
}

async fn run_requests(
    conn: &Connection,
    client: &ApiClient,
    json: bool,
    command: RequestCommand,
) -> Result<(), AppError> {
    session_service::require_developer(conn, client).await?;
    let (id, decision, note) = match command {
        RequestCommand::List { status } => {
            let requests = control_service::list_access_requests(client, status).await?;
            return emit(json, &requests, |requests| {
                for r in requests {
                    println!(
                        "{:>5}  {:<9}  {:<16}  {}",
                        r.id,
                        format!("{:?}", r.status),
                        r.username,
                        r.message.as_deref().unwrap_or("")
                    );
                }
            });
        }
        RequestCommand::Approve { id, note } => (id, Decision::Approve, note),
        RequestCommand::Reject { id, note } => (id, Decision::Reject, note),
    };

    let request =
        control_service::decide_access_request(client, id, decision, note.as_deref()).await?;
    emit(json, &request, |r| {
        println!("Request {} for {} is {:?}", r.id, r.username, r.status)
    })
}
