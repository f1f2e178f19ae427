use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use todo_client::config::{config_schema, load_config, DEFAULT_CONFIG_PATH};
use todo_client::error::{ClientError, ClientResult};
use todo_client::models::{CreateTodo, Priority, RegisterRequest, Todo, UpdateTodo};
use todo_client::startup::build_state;
use todo_client::state::AppState;
use todo_client::utils::logger::init_logging;

#[derive(Parser, Debug)]
#[command(name = "todo-client", about = "Todo list client with a persistent login session")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, short, env = "TODO_CLIENT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TODO_CLIENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in with a Google ID token.
    GoogleLogin {
        #[arg(long)]
        id_token: String,
    },
    /// Create an account; it must be confirmed by email before logging in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TODO_CLIENT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Confirm an email address with the token from the confirmation mail.
    Confirm { token: String },
    /// Set a new password with the token from the reset mail.
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "TODO_CLIENT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show who is logged in and whether the access token is still valid.
    Status,
    Todos(TodosCommand),
    /// Print the JSON schema of the configuration file.
    Schema,
}

#[derive(Args, Debug)]
struct TodosCommand {
    #[command(subcommand)]
    command: TodosSubcommand,
}

#[derive(Subcommand, Debug)]
enum TodosSubcommand {
    List,
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due_date: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due_date: Option<String>,
    },
    /// Mark a todo as done (or not done, with --undo).
    Toggle {
        id: i64,
        #[arg(long)]
        undo: bool,
    },
    Delete { id: i64 },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Schema = cli.command {
        match config_schema() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Error generating schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = Arc::new(load_config(&cli.config));

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initializing logging: {}", e);
        std::process::exit(1);
    }

    let state = match build_state(config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, &state).await {
        eprintln!("Error: {}", e);
        if e.requires_login() {
            eprintln!("Log in with `todo-client login` and try again.");
        }
        std::process::exit(1);
    }
}

async fn run(command: Command, state: &AppState) -> ClientResult<()> {
    match command {
        Command::Login { email, password } => {
            let user = state.auth.login(&email, &password).await?;
            println!("Logged in as {}", user.display_name());
        }
        Command::GoogleLogin { id_token } => {
            let user = state.auth.google_login(&id_token).await?;
            println!("Logged in as {}", user.display_name());
        }
        Command::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let response = state
                .auth
                .register(&RegisterRequest {
                    email,
                    password,
                    first_name,
                    last_name,
                })
                .await?;
            println!("{}", response.message);
        }
        Command::Confirm { token } => {
            println!("{}", state.auth.confirm_email(&token).await?.message);
        }
        Command::ResetPassword { token, password } => {
            println!("{}", state.auth.reset_password(&token, &password).await?.message);
        }
        Command::Logout => {
            state.auth.logout();
            println!("Logged out");
        }
        Command::Status => print_status(state),
        Command::Todos(todos) => {
            // Expired access tokens are fine here; the first call refreshes them.
            if !state.session.is_authenticated() {
                return Err(ClientError::AuthenticationRequired);
            }
            run_todos(todos.command, state).await?;
        }
        Command::Schema => unreachable!("handled before configuration is loaded"),
    }
    Ok(())
}

async fn run_todos(command: TodosSubcommand, state: &AppState) -> ClientResult<()> {
    match command {
        TodosSubcommand::List => {
            let todos = state.todos.list().await?;
            if todos.is_empty() {
                println!("No todos");
            }
            for todo in &todos {
                println!("{}", format_todo(todo));
            }
        }
        TodosSubcommand::Add {
            title,
            description,
            priority,
            due_date,
        } => {
            let todo = state
                .todos
                .create(&CreateTodo {
                    title,
                    description,
                    priority,
                    due_date,
                })
                .await?;
            println!("Created {}", format_todo(&todo));
        }
        TodosSubcommand::Update {
            id,
            title,
            description,
            completed,
            priority,
            due_date,
        } => {
            let changes = UpdateTodo {
                title,
                description,
                completed,
                priority,
                due_date,
            };
            println!("Updated {}", format_todo(&state.todos.update(id, &changes).await?));
        }
        TodosSubcommand::Toggle { id, undo } => {
            println!("{}", format_todo(&state.todos.toggle(id, !undo).await?));
        }
        TodosSubcommand::Delete { id } => {
            state.todos.delete(id).await?;
            println!("Deleted todo {}", id);
        }
    }
    Ok(())
}

fn print_status(state: &AppState) {
    let session = &state.session;
    if !session.is_authenticated() {
        println!("Not logged in");
        return;
    }
    match session.user() {
        Some(user) => println!("Logged in as {} <{}>", user.display_name(), user.email),
        None => println!("Logged in"),
    }
    if session.is_expired() {
        println!("Access token expired; it will be refreshed on the next request");
    } else {
        println!("Access token valid");
    }
}

fn format_todo(todo: &Todo) -> String {
    let mut line = format!(
        "[{}] #{} {}",
        if todo.completed { "x" } else { " " },
        todo.id,
        todo.title
    );
    if let Some(priority) = todo.priority {
        line.push_str(&format!(" ({:?})", priority));
    }
    if let Some(due_date) = &todo.due_date {
        line.push_str(&format!(" due {}", due_date));
    }
    line
}
