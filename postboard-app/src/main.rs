//! postboard - Browse and edit posts on a JSON posts API

use clap::{Parser, Subcommand, ValueEnum};
use libpostboard::logging;
use libpostboard::service::Outcome;
use libpostboard::types::{Post, PostDraft, PostEdits, PostId, PostRef, UserId, UserRef};
use libpostboard::{Config, PostboardError, ReactionKind};
use postboard_app::{AppError, Dispatcher, Result};

#[derive(Parser, Debug)]
#[command(name = "postboard")]
#[command(version, about = "Browse and edit posts on a JSON posts API")]
#[command(long_about = r#"Browse and edit posts on a JSON posts API.

Every command loads the full post list first, then applies its change
locally and against the server.

EXAMPLES:
    # Newest posts first
    postboard list

    # Posts by one author, as JSON
    postboard list --user 1 --format json

    # Create, edit and delete
    postboard create --title "Hello" --body "First post" --user 1
    postboard edit 9 --title "Better title"
    postboard delete 7

    # Add a reaction (thumbsUp, wow, heart, rocket, coffee)
    postboard react 5 wow

CONFIGURATION:
    POSTBOARD_CONFIG     Path to config.toml
    POSTBOARD_API_URL    Override the API base URL

EXIT CODES:
    0 - Success
    1 - Error (network failure, server error, bad response)
    2 - Post not found
    3 - Invalid input
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List posts, newest first
    List {
        /// Only posts by this author
        #[arg(short, long, value_name = "USER_ID")]
        user: Option<UserId>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show a single post
    Show {
        id: PostId,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Create a post
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        /// Author id
        #[arg(long, value_name = "USER_ID")]
        user: String,
    },

    /// Edit a post; omitted fields keep their current value
    Edit {
        id: PostId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        body: Option<String>,

        #[arg(long, value_name = "USER_ID")]
        user: Option<UserId>,
    },

    /// Delete a post
    Delete { id: PostId },

    /// Add a reaction to a post
    React {
        id: PostId,

        /// thumbsUp, wow, heart, rocket or coffee
        reaction: String,
    },

    /// Show the load status of the post list
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    logging::from_settings(&config.logging, cli.verbose).init();

    let mut dispatcher = Dispatcher::from_config(&config)?;
    let loaded = dispatcher.fetch_posts();

    // A failed load is still worth reporting through `status`
    if !matches!(cli.command, Command::Status) {
        if let Outcome::Rejected(e) = loaded {
            return Err(e.into());
        }
    }

    match cli.command {
        Command::List { user, format } => {
            let posts: Vec<Post> = match user {
                Some(user_id) => dispatcher.posts_by_user(user_id).as_ref().clone(),
                None => dispatcher.all_posts().into_iter().cloned().collect(),
            };
            print_posts(&posts, format)?;
        }
        Command::Show { id, format } => {
            let post = dispatcher.post(id).ok_or(AppError::NotFound(id))?;
            print_posts(std::slice::from_ref(post), format)?;
        }
        Command::Create { title, body, user } => {
            if title.trim().is_empty() || body.trim().is_empty() {
                return Err(invalid("title and body must not be empty"));
            }
            let draft = PostDraft {
                title,
                body,
                user_id: parse_user_ref(&user),
            };
            let before: Vec<PostId> = dispatcher.post_ids().to_vec();
            settle(dispatcher.add_new_post(draft))?;

            let created = dispatcher
                .all_posts()
                .into_iter()
                .find(|post| !before.contains(&post.id))
                .cloned();
            match created {
                Some(post) => println!("Created post {}", post.id),
                None => println!("Created post (replaced an existing id)"),
            }
        }
        Command::Edit {
            id,
            title,
            body,
            user,
        } => {
            if title.is_none() && body.is_none() && user.is_none() {
                return Err(invalid("nothing to change; pass --title, --body or --user"));
            }
            let mut edits = PostEdits::new(id);
            edits.title = title;
            edits.body = body;
            edits.user_id = user.map(UserRef::Number);

            settle(dispatcher.update_post(edits))?;
            let post = dispatcher.post(id).ok_or(AppError::NotFound(id))?;
            print_posts(std::slice::from_ref(post), OutputFormat::Text)?;
        }
        Command::Delete { id } => {
            settle(dispatcher.delete_post(PostRef { id }))?;
            println!("Deleted post {}", id);
        }
        Command::React { id, reaction } => {
            let kind: ReactionKind = reaction
                .parse()
                .map_err(|e: String| invalid(&e))?;
            if dispatcher.post(id).is_none() {
                return Err(AppError::NotFound(id));
            }
            dispatcher.react(id, kind.as_str());
            let post = dispatcher.post(id).ok_or(AppError::NotFound(id))?;
            println!("{} {} on post {}", post.reactions.get(kind), kind, id);
        }
        Command::Status => print_status(&dispatcher),
    }

    Ok(())
}

fn invalid(message: &str) -> AppError {
    PostboardError::InvalidInput(message.to_string()).into()
}

fn parse_user_ref(user: &str) -> UserRef {
    match user.trim().parse::<UserId>() {
        Ok(id) => UserRef::Number(id),
        Err(_) => UserRef::Text(user.to_string()),
    }
}

/// Report an optimistic apply and turn a rejection into an error
fn settle(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::AppliedOptimistically(e) => {
            eprintln!("Warning: server did not confirm the change ({}); applied locally", e);
            Ok(())
        }
        Outcome::Rejected(e) => Err(e.into()),
    }
}

fn print_posts(posts: &[Post], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(posts)?),
        OutputFormat::Text => {
            if posts.is_empty() {
                println!("No posts");
            }
            for post in posts {
                let author = post
                    .user_id
                    .map_or_else(|| "unknown".to_string(), |id| id.to_string());
                println!(
                    "#{} {} (user {}, {})",
                    post.id,
                    post.title,
                    author,
                    post.date.format("%Y-%m-%d %H:%M")
                );
                println!("    {}", post.body.replace('\n', "\n    "));
                let reactions: Vec<String> = ReactionKind::ALL
                    .iter()
                    .map(|kind| format!("{} {}", kind, post.reactions.get(*kind)))
                    .collect();
                println!("    {}", reactions.join("  "));
            }
        }
    }
    Ok(())
}

fn print_status(dispatcher: &Dispatcher) {
    println!("status: {}", dispatcher.status());
    println!("posts:  {}", dispatcher.post_ids().len());
    if let Some(error) = dispatcher.error() {
        println!("error:  {}", error);
    }
}
