//! Trellis CLI entry point.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use trellis::{
    Config, Entity, EntityType, FileGraphStore, GraphManager, ObservationDeletion, PriorityValue,
    Relation, RelationType, StatusValue,
};

/// Trellis: project-management knowledge graph
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the synthetic status and priority value entities
    Init,

    /// Add an entity to the graph
    AddEntity {
        /// Entity name
        name: String,
        /// Entity type (project, task, milestone, teamMember, ...)
        #[arg(short = 't', long = "type")]
        entity_type: String,
        /// Initial observations (repeatable)
        #[arg(short, long = "observation")]
        observations: Vec<String>,
    },

    /// Add a relation between two existing entities
    Relate {
        /// Source entity name
        from: String,
        /// Target entity name
        to: String,
        /// Relation type (depends_on, assigned_to, part_of, ...)
        #[arg(short = 't', long = "type")]
        relation_type: String,
    },

    /// Remove a relation
    Unrelate {
        /// Source entity name
        from: String,
        /// Target entity name
        to: String,
        /// Relation type
        #[arg(short = 't', long = "type")]
        relation_type: String,
    },

    /// Append observations to an entity
    Observe {
        /// Entity name
        entity: String,
        /// Observations to add
        #[arg(required = true)]
        observations: Vec<String>,
    },

    /// Remove specific observations from an entity
    DeleteObservations {
        /// Entity name
        entity: String,
        /// Observations to remove (exact match)
        #[arg(required = true)]
        observations: Vec<String>,
    },

    /// Delete entities and every relation that touches them
    Remove {
        /// Entity names to delete
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Set an entity's status (active, completed, pending, blocked, cancelled)
    SetStatus {
        /// Entity name
        entity: String,
        /// Status value
        status: String,
    },

    /// Set an entity's priority (high, low)
    SetPriority {
        /// Entity name
        entity: String,
        /// Priority value
        priority: String,
    },

    /// Show an entity's current status and priority
    Status {
        /// Entity name
        entity: String,
    },

    /// Search entities by substring over names, types, and observations
    Search {
        /// Search query
        query: String,
    },

    /// Retrieve specific entities by exact name
    Open {
        /// Entity names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Dump the whole graph
    Read,

    /// Analytics reports
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Full project overview
    Overview {
        /// Project name
        project: String,
    },
    /// Task dependency tree and critical path
    Dependencies {
        /// Task name
        task: String,
        /// Traversal depth
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },
    /// A team member's assignments and workload
    Assignments {
        /// Team member name
        member: String,
    },
    /// Milestone progress for a project
    Milestones {
        /// Project name
        project: String,
        /// Restrict to a single milestone
        #[arg(short, long)]
        milestone: Option<String>,
    },
    /// Chronological project timeline
    Timeline {
        /// Project name
        project: String,
    },
    /// Resource allocation and utilization
    Resources {
        /// Project name
        project: String,
        /// Restrict to a single resource
        #[arg(short, long)]
        resource: Option<String>,
    },
    /// Project risks ranked by score
    Risks {
        /// Project name
        project: String,
    },
    /// Projects related through shared teams, resources, and dependencies
    Related {
        /// Project name
        project: String,
        /// Traversal depth
        #[arg(short, long, default_value = "1")]
        depth: usize,
    },
    /// Decision log for a project
    Decisions {
        /// Project name
        project: String,
    },
    /// Project health score and recommendations
    Health {
        /// Project name
        project: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    let store = Arc::new(FileGraphStore::new(config.graph_path()?));
    let manager = GraphManager::new(store);
    let pretty = args.pretty;

    match args.command {
        Command::Init => {
            manager.initialize_status_and_priority().await?;
            eprintln!("status and priority entities initialized");
        }
        Command::AddEntity {
            name,
            entity_type,
            observations,
        } => {
            let entity_type: EntityType = entity_type.parse()?;
            let entity = Entity::new(name, entity_type).with_observations(observations);
            let graph = manager.create_entities(vec![entity]).await?;
            print_json(&graph, pretty)?;
        }
        Command::Relate {
            from,
            to,
            relation_type,
        } => {
            let relation_type: RelationType = relation_type.parse()?;
            let graph = manager
                .create_relations(vec![Relation::new(from, relation_type, to)])
                .await?;
            print_json(&graph, pretty)?;
        }
        Command::Unrelate {
            from,
            to,
            relation_type,
        } => {
            let relation_type: RelationType = relation_type.parse()?;
            manager
                .delete_relations(&[Relation::new(from, relation_type, to)])
                .await?;
            eprintln!("relation deleted");
        }
        Command::Observe {
            entity,
            observations,
        } => {
            let graph = manager.add_observations(&entity, observations).await?;
            print_json(&graph, pretty)?;
        }
        Command::DeleteObservations {
            entity,
            observations,
        } => {
            manager
                .delete_observations(&[ObservationDeletion {
                    entity_name: entity,
                    observations,
                }])
                .await?;
            eprintln!("observations deleted");
        }
        Command::Remove { names } => {
            manager.delete_entities(&names).await?;
            eprintln!("entities deleted");
        }
        Command::SetStatus { entity, status } => {
            let status: StatusValue = status.parse()?;
            manager.set_status(&entity, status).await?;
            eprintln!("status set to {status}");
        }
        Command::SetPriority { entity, priority } => {
            let priority: PriorityValue = priority.parse()?;
            manager.set_priority(&entity, priority).await?;
            eprintln!("priority set to {priority}");
        }
        Command::Status { entity } => {
            let status = manager.get_status(&entity).await?;
            let priority = manager.get_priority(&entity).await?;
            print_json(
                &serde_json::json!({
                    "entity": entity,
                    "status": status,
                    "priority": priority,
                }),
                pretty,
            )?;
        }
        Command::Search { query } => {
            let graph = manager.search_nodes(&query).await?;
            print_json(&graph, pretty)?;
        }
        Command::Open { names } => {
            let graph = manager.open_nodes(&names).await?;
            print_json(&graph, pretty)?;
        }
        Command::Read => {
            let graph = manager.read_graph().await?;
            print_json(&graph, pretty)?;
        }
        Command::Report { report } => run_report(&manager, report, pretty).await?,
    }

    Ok(())
}

async fn run_report(
    manager: &GraphManager,
    report: ReportCommand,
    pretty: bool,
) -> anyhow::Result<()> {
    match report {
        ReportCommand::Overview { project } => {
            print_json(&manager.project_overview(&project).await?, pretty)
        }
        ReportCommand::Dependencies { task, depth } => {
            print_json(&manager.task_dependencies(&task, depth).await?, pretty)
        }
        ReportCommand::Assignments { member } => {
            print_json(&manager.team_member_assignments(&member).await?, pretty)
        }
        ReportCommand::Milestones { project, milestone } => print_json(
            &manager
                .milestone_progress(&project, milestone.as_deref())
                .await?,
            pretty,
        ),
        ReportCommand::Timeline { project } => {
            print_json(&manager.project_timeline(&project).await?, pretty)
        }
        ReportCommand::Resources { project, resource } => print_json(
            &manager
                .resource_allocation(&project, resource.as_deref())
                .await?,
            pretty,
        ),
        ReportCommand::Risks { project } => {
            print_json(&manager.project_risks(&project).await?, pretty)
        }
        ReportCommand::Related { project, depth } => {
            print_json(&manager.related_projects(&project, depth).await?, pretty)
        }
        ReportCommand::Decisions { project } => {
            print_json(&manager.decision_log(&project).await?, pretty)
        }
        ReportCommand::Health { project } => {
            print_json(&manager.project_health(&project).await?, pretty)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
