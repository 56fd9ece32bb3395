use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_catalog::catalog::operations::not_found_message;
use course_catalog::catalog::{AddOutcome, Course};
use course_catalog::config::{load_config, CatalogConfig};
use course_catalog::lifecycle::Services;
use course_catalog::observability::RequestContext;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Manage the course catalog file directly", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the catalog file from the configuration.
    #[arg(long)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every course
    List,
    /// Show one course as JSON
    Show { code: String },
    /// Add a course
    Add {
        #[arg(long, default_value = "")]
        code: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        instructor: String,
        #[arg(long, default_value = "")]
        semester: String,
        #[arg(long, default_value = "")]
        schedule: String,
        #[arg(long, default_value = "")]
        classroom: String,
        #[arg(long, default_value = "")]
        prerequisites: String,
        #[arg(long, default_value = "")]
        grading: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a course by code
    Delete { code: String },
}

impl Commands {
    fn context(&self) -> RequestContext {
        let (method, url) = match self {
            Commands::List => ("GET", "cli://catalog".to_string()),
            Commands::Show { code } => ("GET", format!("cli://course/{code}")),
            Commands::Add { .. } => ("POST", "cli://add_course".to_string()),
            Commands::Delete { code } => ("DELETE", format!("cli://delete_course/{code}")),
        };
        RequestContext::new(method, url, "local")
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CatalogConfig::default(),
    };
    if let Some(catalog) = cli.catalog.clone() {
        config.storage.catalog_path = catalog;
    }
    // Request records still go to the log file; keep the terminal for output.
    config.logging.console = false;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let services = Services::from_config(&config)?;
    let ctx = cli.command.context();
    let result = run(&services, &ctx, cli.command);
    services.shutdown();
    result
}

fn run(
    services: &Services,
    ctx: &RequestContext,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = &services.catalog;
    match command {
        Commands::List => {
            for course in catalog.list_courses(ctx)? {
                println!("{:<10} {:<30} {}", course.code, course.name, course.instructor);
            }
        }
        Commands::Show { code } => match catalog.course_details(ctx, &code)? {
            Some(course) => println!("{}", serde_json::to_string_pretty(&course)?),
            None => return Err(not_found_message(&code).into()),
        },
        Commands::Add {
            code,
            name,
            instructor,
            semester,
            schedule,
            classroom,
            prerequisites,
            grading,
            description,
        } => {
            let course = Course {
                code,
                name,
                instructor,
                semester,
                schedule,
                classroom,
                prerequisites,
                grading,
                description,
            };
            match catalog.add_course(ctx, course)? {
                AddOutcome::Rejected {
                    missing_required_fields,
                } => {
                    let fields: Vec<_> = missing_required_fields.into_iter().collect();
                    return Err(format!("Required fields are empty: {}", fields.join(", ")).into());
                }
                AddOutcome::Added {
                    course,
                    empty_optional_fields,
                } => {
                    println!("Course '{}' added successfully!", course.name);
                    if !empty_optional_fields.is_empty() {
                        eprintln!("Warning: empty fields: {:?}", empty_optional_fields);
                    }
                }
            }
        }
        Commands::Delete { code } => {
            catalog.delete_course(ctx, &code)?;
            println!("Course with code '{code}' deleted successfully!");
        }
    }
    Ok(())
}
