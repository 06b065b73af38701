use clap::Parser;
use log::{error, info};
use redditkit::{AppConfig, RedditClient, VoteDirection};

#[derive(Parser, Debug)]
#[command(
    name = "redditkit",
    version,
    about = "Reddit API client with safe-mode write guards."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show a user's profile.
    User {
        #[arg(help = "Reddit username", required = true)]
        username: String,
    },

    /// Show a single post.
    Post {
        #[arg(help = "Post id (bare or t3_-prefixed)", required = true)]
        id: String,
    },

    /// Show subreddit metadata.
    Subreddit {
        #[arg(help = "Subreddit name", required = true)]
        name: String,
    },

    /// Fetch top posts from a subreddit.
    Top {
        #[arg(help = "Subreddit name", required = true)]
        subreddit: String,

        #[arg(default_value = "week", help = "hour, day, week, month, year or all")]
        period: String,

        #[arg(default_value_t = 10, help = "Number of posts to retrieve")]
        limit: u32,
    },

    /// Search Reddit, optionally within one subreddit.
    Search {
        #[arg(help = "Search query", required = true)]
        query: String,

        #[arg(long, help = "Restrict results to a subreddit")]
        subreddit: Option<String>,

        #[arg(long, default_value_t = 25)]
        limit: u32,
    },

    /// Show a post with its flattened comment tree.
    Comments {
        #[arg(help = "Post id", required = true)]
        post_id: String,

        #[arg(default_value_t = 100)]
        limit: u32,
    },

    /// Submit a self post (requires user credentials).
    Submit {
        #[arg(help = "Subreddit name", required = true)]
        subreddit: String,

        #[arg(help = "Post title", required = true)]
        title: String,

        #[arg(help = "Post text content", required = true)]
        text: String,
    },

    /// Reply to a post or comment (requires user credentials).
    Reply {
        #[arg(help = "Target thing id (t3_/t1_ or bare post id)", required = true)]
        thing_id: String,

        #[arg(help = "Comment text", required = true)]
        text: String,
    },

    /// Vote on a post or comment (requires user credentials).
    Vote {
        #[arg(help = "Target thing id", required = true)]
        thing_id: String,

        #[arg(help = "up, down or clear", required = true)]
        direction: String,
    },
}

async fn run(cli: Cli) -> redditkit::Result<()> {
    let mut config = AppConfig::load()?;
    let resolver = redditkit::secrets::resolver_for(config.secret_provider);
    let secrets = resolver.resolve(config.username.as_deref()).await?;
    config.apply_secrets(secrets);

    let client = RedditClient::new(&config)?;

    match cli.command {
        Commands::User { username } => {
            let user = client.get_user(&username).await?;
            println!(
                "u/{} | {} comment karma | {} link karma | mod: {}",
                user.name, user.comment_karma, user.link_karma, user.is_mod
            );
        }
        Commands::Post { id } => {
            let post = client.get_post(&id).await?;
            println!("{}", post.format_summary());
            println!("{} | https://reddit.com{}", post.format_timestamp(), post.permalink);
        }
        Commands::Subreddit { name } => {
            let sub = client.get_subreddit_info(&name).await?;
            println!(
                "r/{} | {} subscribers | {}",
                sub.name, sub.subscribers, sub.title
            );
            if !sub.description.is_empty() {
                println!("{}", sub.description);
            }
        }
        Commands::Top {
            subreddit,
            period,
            limit,
        } => {
            info!("gathering top posts from r/{}", subreddit);
            for post in client.get_top_posts(&subreddit, &period, limit).await? {
                println!("{}", post.format_summary());
            }
        }
        Commands::Search {
            query,
            subreddit,
            limit,
        } => {
            for post in client
                .search_reddit(&query, subreddit.as_deref(), limit)
                .await?
            {
                println!("{}", post.format_summary());
            }
        }
        Commands::Comments { post_id, limit } => {
            let (post, comments) = client.get_post_comments(&post_id, limit).await?;
            println!("{}\n", post.format_summary());
            for comment in comments {
                let indent = "  ".repeat(comment.depth as usize);
                println!(
                    "{}u/{} ({} pts): {}",
                    indent,
                    comment.author,
                    comment.score,
                    comment.body.replace('\n', " ")
                );
            }
        }
        Commands::Submit {
            subreddit,
            title,
            text,
        } => {
            let outcome = client.create_post(&subreddit, &title, &text).await?;
            match outcome.url {
                Some(url) => println!("Post created: {}", url),
                None => println!(
                    "Post created: {}",
                    outcome.name.unwrap_or_else(|| "(no id returned)".to_string())
                ),
            }
        }
        Commands::Reply { thing_id, text } => {
            let outcome = client.reply_to_post(&thing_id, &text).await?;
            match outcome.url {
                Some(url) => println!("Comment created: https://reddit.com{}", url),
                None => println!(
                    "Comment created: {}",
                    outcome.name.unwrap_or_else(|| "(no id returned)".to_string())
                ),
            }
        }
        Commands::Vote {
            thing_id,
            direction,
        } => {
            let direction = match direction.to_ascii_lowercase().as_str() {
                "up" => VoteDirection::Up,
                "down" => VoteDirection::Down,
                "clear" => VoteDirection::Clear,
                other => {
                    return Err(redditkit::RedditError::Validation {
                        label: "direction".to_string(),
                        reason: format!("'{}' is not up, down or clear", other),
                    })
                }
            };
            client.vote(&thing_id, direction).await?;
            println!("Vote recorded on {}", thing_id);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("{}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
