// src/commands.rs

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::attendance;
use crate::report;
use crate::tracker_client::{
    EmployeeUpdate, MaterialLogFilter, MaterialLogInput, MaterialTypeInput, MaterialTypeUpdate,
    NewEmployee, PunchRequest, RecordType, TimeRecordFilter, TrackerClient,
};
use crate::AppError;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage employee records
    Employees {
        #[command(subcommand)]
        command: EmployeeCommands,
    },
    /// Show daily attendance built from raw punch events
    Records(RecordsArgs),
    /// Show the server-computed lateness report
    Lateness(LatenessArgs),
    /// Download the lateness report as a PDF file
    LatenessPdf(LatenessPdfArgs),
    /// Manage material types and delivery logs
    Materials {
        #[command(subcommand)]
        command: MaterialCommands,
    },
    /// Submit a clock punch on behalf of an employee
    Punch(PunchArgs),
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommands {
    /// List all employees
    List,
    /// Show one employee in full
    Show { id: i64 },
    /// Register a new employee
    Add(EmployeeAddArgs),
    /// Update fields of an existing employee
    Update(EmployeeUpdateArgs),
    /// Delete an employee
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct EmployeeAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    /// employee, supervisor or admin
    #[arg(long)]
    pub role: String,
    #[arg(long)]
    pub cpf: Option<String>,
    #[arg(long)]
    pub rg: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub admission_date: Option<NaiveDate>,
    #[arg(long)]
    pub base_salary: Option<f64>,
    /// Expected arrival time, HH:MM (drives the lateness report)
    #[arg(long)]
    pub expected_arrival: Option<String>,
    /// Expected departure time, HH:MM
    #[arg(long)]
    pub expected_departure: Option<String>,
}

#[derive(Args, Debug)]
pub struct EmployeeUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub cpf: Option<String>,
    #[arg(long)]
    pub rg: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub admission_date: Option<NaiveDate>,
    #[arg(long)]
    pub base_salary: Option<f64>,
    #[arg(long)]
    pub expected_arrival: Option<String>,
    #[arg(long)]
    pub expected_departure: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecordsArgs {
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub employee_id: Option<i64>,
    /// Also export the aggregated rows as CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LatenessArgs {
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    #[arg(long)]
    pub employee_id: Option<i64>,
    /// Also export the report rows as CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LatenessPdfArgs {
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// Output path; a filename is synthesized from the dates when omitted
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum MaterialCommands {
    /// Manage the material type catalogue
    Types {
        #[command(subcommand)]
        command: MaterialTypeCommands,
    },
    /// View and register material deliveries
    Logs {
        #[command(subcommand)]
        command: MaterialLogCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum MaterialTypeCommands {
    /// List all material types
    List,
    /// Add a new material type
    Add(MaterialTypeAddArgs),
    /// Update an existing material type
    Update(MaterialTypeUpdateArgs),
    /// Delete a material type
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct MaterialTypeAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub expected_duration_days: Option<i64>,
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct MaterialTypeUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub expected_duration_days: Option<i64>,
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum MaterialLogCommands {
    /// List material deliveries
    List(MaterialLogListArgs),
    /// Register a delivery of material to an employee
    Add(MaterialLogAddArgs),
}

#[derive(Args, Debug)]
pub struct MaterialLogListArgs {
    #[arg(long)]
    pub employee_id: Option<i64>,
    #[arg(long)]
    pub material_type_id: Option<i64>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct MaterialLogAddArgs {
    #[arg(long)]
    pub material_type_id: i64,
    #[arg(long)]
    pub employee_id: i64,
    #[arg(long)]
    pub quantity: Option<i64>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub photo_url: Option<String>,
    /// Defaults to today on the server when omitted
    #[arg(long)]
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct PunchArgs {
    #[arg(long)]
    pub employee_id: i64,
    #[arg(long, value_enum)]
    pub record_type: RecordType,
    #[arg(long)]
    pub latitude: Option<f64>,
    #[arg(long)]
    pub longitude: Option<f64>,
    /// Photo file to attach, sent base64-encoded
    #[arg(long, value_name = "FILE")]
    pub photo: Option<PathBuf>,
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

pub async fn run(client: &TrackerClient, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Employees { command } => run_employees(client, command).await,
        Commands::Records(args) => run_records(client, args).await,
        Commands::Lateness(args) => run_lateness(client, args).await,
        Commands::LatenessPdf(args) => run_lateness_pdf(client, args).await,
        Commands::Materials { command } => run_materials(client, command).await,
        Commands::Punch(args) => run_punch(client, args).await,
    }
}

async fn run_employees(client: &TrackerClient, command: EmployeeCommands) -> Result<(), AppError> {
    match command {
        EmployeeCommands::List => {
            info!("Fetching employees...");
            let employees = client.list_employees().await?;
            print!("{}", report::employee_table(&employees));
        }
        EmployeeCommands::Show { id } => {
            info!("Fetching employee {}...", id);
            let employee = client.get_employee(id).await?;
            print!("{}", report::employee_details(&employee));
        }
        EmployeeCommands::Add(args) => {
            let new_employee = NewEmployee {
                name: args.name,
                email: args.email,
                password: args.password,
                role: args.role,
                cpf: args.cpf,
                rg: args.rg,
                phone_number: args.phone,
                address: args.address,
                admission_date: format_date(args.admission_date),
                base_salary: args.base_salary,
                expected_arrival_time: args.expected_arrival,
                expected_departure_time: args.expected_departure,
            };
            let created = client.create_employee(&new_employee).await?;
            println!(
                "{} (id {})",
                created.message, created.employee.id
            );
        }
        EmployeeCommands::Update(args) => {
            let update = EmployeeUpdate {
                name: args.name,
                email: args.email,
                password: args.password,
                role: args.role,
                cpf: args.cpf,
                rg: args.rg,
                phone_number: args.phone,
                address: args.address,
                admission_date: format_date(args.admission_date),
                base_salary: args.base_salary,
                expected_arrival_time: args.expected_arrival,
                expected_departure_time: args.expected_departure,
            };
            let status = client.update_employee(args.id, &update).await?;
            println!("{}", status.message);
        }
        EmployeeCommands::Delete { id, yes } => {
            if !yes {
                println!("Refusing to delete employee {} without --yes.", id);
                return Ok(());
            }
            let status = client.delete_employee(id).await?;
            println!("{}", status.message);
        }
    }
    Ok(())
}

async fn run_records(client: &TrackerClient, args: RecordsArgs) -> Result<(), AppError> {
    let filter = TimeRecordFilter {
        start_date: args.start_date,
        end_date: args.end_date,
        employee_id: args.employee_id,
    };
    info!("Fetching time records...");
    let records = client.get_time_records(&filter).await?;
    info!("Fetched {} punch events", records.len());

    let rows = attendance::group_daily(&records);
    print!("{}", report::attendance_table(&rows));

    if let Some(path) = args.csv {
        report::write_attendance_csv(&path, &rows)?;
        println!("Attendance CSV written to {}", path.display());
    }
    Ok(())
}

async fn run_lateness(client: &TrackerClient, args: LatenessArgs) -> Result<(), AppError> {
    let filter = TimeRecordFilter {
        start_date: args.start_date,
        end_date: args.end_date,
        employee_id: args.employee_id,
    };
    info!("Fetching lateness report...");
    let records = client.get_lateness_report(&filter).await?;
    print!("{}", report::lateness_table(&records));

    if let Some(path) = args.csv {
        report::write_lateness_csv(&path, &records)?;
        println!("Lateness CSV written to {}", path.display());
    }
    Ok(())
}

async fn run_lateness_pdf(client: &TrackerClient, args: LatenessPdfArgs) -> Result<(), AppError> {
    let filter = TimeRecordFilter {
        start_date: args.start_date,
        end_date: args.end_date,
        employee_id: None,
    };
    info!("Downloading lateness PDF...");
    let bytes = client.download_lateness_pdf(&filter).await?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(report::default_lateness_pdf_filename(&filter)));
    report::save_pdf(&path, &bytes)?;
    println!("Lateness report saved to {}", path.display());
    Ok(())
}

async fn run_materials(client: &TrackerClient, command: MaterialCommands) -> Result<(), AppError> {
    match command {
        MaterialCommands::Types { command } => match command {
            MaterialTypeCommands::List => {
                info!("Fetching material types...");
                let types = client.list_material_types().await?;
                print!("{}", report::material_type_table(&types));
            }
            MaterialTypeCommands::Add(args) => {
                let input = MaterialTypeInput {
                    name: args.name,
                    description: args.description,
                    expected_duration_days: args.expected_duration_days,
                    category: args.category,
                };
                let created = client.create_material_type(&input).await?;
                println!("{} (id {})", created.message, created.material_type_id);
            }
            MaterialTypeCommands::Update(args) => {
                let update = MaterialTypeUpdate {
                    name: args.name,
                    description: args.description,
                    expected_duration_days: args.expected_duration_days,
                    category: args.category,
                };
                let status = client.update_material_type(args.id, &update).await?;
                println!("{}", status.message);
            }
            MaterialTypeCommands::Delete { id, yes } => {
                if !yes {
                    println!("Refusing to delete material type {} without --yes.", id);
                    return Ok(());
                }
                let status = client.delete_material_type(id).await?;
                println!("{}", status.message);
            }
        },
        MaterialCommands::Logs { command } => match command {
            MaterialLogCommands::List(args) => {
                let filter = MaterialLogFilter {
                    employee_id: args.employee_id,
                    material_type_id: args.material_type_id,
                    start_date: args.start_date,
                    end_date: args.end_date,
                };
                info!("Fetching material logs...");
                let logs = client.list_material_logs(&filter).await?;
                print!("{}", report::material_log_table(&logs));
            }
            MaterialLogCommands::Add(args) => {
                let input = MaterialLogInput {
                    material_type_id: args.material_type_id,
                    employee_id: args.employee_id,
                    quantity: args.quantity,
                    photo_url: args.photo_url,
                    notes: args.notes,
                    delivery_date: format_date(args.delivery_date),
                };
                let created = client.log_material_delivery(&input).await?;
                println!("{} (id {})", created.message, created.log_id);
            }
        },
    }
    Ok(())
}

async fn run_punch(client: &TrackerClient, args: PunchArgs) -> Result<(), AppError> {
    let photo_data = match &args.photo {
        Some(path) => {
            let bytes = fs::read(path)?;
            info!("Attaching photo {} ({} bytes)", path.display(), bytes.len());
            Some(BASE64_STANDARD.encode(bytes))
        }
        None => None,
    };

    let punch = PunchRequest {
        employee_id: args.employee_id,
        record_type: args.record_type,
        latitude: args.latitude,
        longitude: args.longitude,
        photo_data,
    };
    let response = client.submit_punch(&punch).await?;
    match response.time {
        Some(time) => println!("{} ({})", response.message, time),
        None => println!("{}", response.message),
    }
    Ok(())
}
