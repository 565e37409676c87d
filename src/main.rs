use std::path::PathBuf;

use anyhow::bail;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use strum::IntoEnumIterator;

mod compliance;
mod finance;
mod models;
mod report;
mod workbook;

use models::{Category, CategoryInputs, ComplianceScore, EvaluationSession, FinancialIndicators};

/// Share of checklist requirements a project must satisfy to pass the
/// standalone environmental checklist.
const CHECKLIST_PASS_THRESHOLD: f64 = 70.0;

#[derive(Parser)]
#[command(name = "green-bond-evaluator")]
#[command(about = "Green bond project viability evaluator (ICMA criteria)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute financial viability indicators from a cash-flow workbook
    Finance {
        #[arg(long)]
        workbook: PathBuf,
        #[arg(long, default_value_t = 0.10)]
        discount_rate: f64,
        /// Token identifying the cash-flow row in the workbook
        #[arg(long, default_value = "FCL")]
        marker: String,
        #[arg(long)]
        json: bool,
    },
    /// Score environmental compliance for one ICMA category
    Environment {
        #[arg(long, value_enum)]
        category: Category,
        #[command(flatten)]
        inputs: CategoryArgs,
        #[arg(long)]
        json: bool,
    },
    /// Run the full evaluation and export the viability result table
    Evaluate {
        #[arg(long)]
        workbook: PathBuf,
        #[arg(long, default_value_t = 0.10)]
        discount_rate: f64,
        #[arg(long, default_value = "FCL")]
        marker: String,
        #[arg(long, value_enum)]
        category: Category,
        #[command(flatten)]
        inputs: CategoryArgs,
        /// Bonus added to the compliance percentage for the total score
        #[arg(long, default_value_t = report::VIABILITY_BONUS)]
        bonus: f64,
        /// Result file path; defaults to green_bond_result_<date>.csv
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Walk a category sheet of the ICMA requirements checklist workbook
    Checklist {
        #[arg(long)]
        workbook: PathBuf,
        /// Category sheet to evaluate; omit to list the available sheets
        #[arg(long)]
        sheet: Option<String>,
        /// 1-based positions of the requirements the project satisfies
        #[arg(long, value_delimiter = ',')]
        met: Vec<usize>,
        #[arg(long, default_value = "checklist_result.csv")]
        out: PathBuf,
    },
    /// List the ICMA categories and whether each has a scoring formula
    Categories,
}

#[derive(Args)]
struct CategoryArgs {
    /// Project energy consumption (kWh)
    #[arg(long)]
    total_energy: Option<f64>,
    /// Baseline energy consumption (kWh)
    #[arg(long)]
    baseline_energy: Option<f64>,
    /// Total water used (m^3)
    #[arg(long)]
    total_water: Option<f64>,
    /// Water reused (m^3)
    #[arg(long)]
    reused_water: Option<f64>,
    /// Total waste generated (kg)
    #[arg(long)]
    total_waste: Option<f64>,
    /// Waste recycled (kg)
    #[arg(long)]
    recycled_waste: Option<f64>,
    /// Whether the project reuses previously developed land
    #[arg(long)]
    land_reuse: Option<bool>,
    /// CO2 emissions avoided (tonnes)
    #[arg(long)]
    co2_avoided: Option<f64>,
}

impl From<CategoryArgs> for CategoryInputs {
    fn from(args: CategoryArgs) -> Self {
        CategoryInputs {
            total_energy: args.total_energy,
            baseline_energy: args.baseline_energy,
            total_water: args.total_water,
            reused_water: args.reused_water,
            total_waste: args.total_waste,
            recycled_waste: args.recycled_waste,
            land_reuse: args.land_reuse,
            co2_avoided: args.co2_avoided,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Finance {
            workbook,
            discount_rate,
            marker,
            json,
        } => {
            let indicators = run_finance(&workbook, discount_rate, &marker)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&indicators)?);
            } else {
                print_indicators(&indicators);
            }
        }
        Commands::Environment {
            category,
            inputs,
            json,
        } => {
            let score = compliance::score_category(category, &inputs.into())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&score)?);
            } else {
                print_compliance(category, score);
            }
        }
        Commands::Evaluate {
            workbook,
            discount_rate,
            marker,
            category,
            inputs,
            bonus,
            out,
        } => {
            run_evaluate(
                &workbook,
                discount_rate,
                &marker,
                category,
                &inputs.into(),
                bonus,
                out,
            )?;
        }
        Commands::Checklist {
            workbook,
            sheet,
            met,
            out,
        } => {
            run_checklist(&workbook, sheet.as_deref(), &met, &out)?;
        }
        Commands::Categories => {
            for category in Category::iter() {
                let status = if compliance::is_supported(category) {
                    "scored"
                } else {
                    "no scoring formula yet"
                };
                println!("- {category} ({status})");
            }
        }
    }

    Ok(())
}

fn run_finance(
    workbook: &std::path::Path,
    discount_rate: f64,
    marker: &str,
) -> anyhow::Result<FinancialIndicators> {
    if discount_rate <= -1.0 {
        bail!("discount rate must be greater than -1.0, got {discount_rate}");
    }

    let cash_flows = workbook::read_cash_flow(workbook, marker)?;
    println!(
        "Cash-flow series ({} periods): {:?}",
        cash_flows.len(),
        cash_flows
    );

    Ok(finance::compute_indicators(&cash_flows, discount_rate))
}

fn run_evaluate(
    workbook: &std::path::Path,
    discount_rate: f64,
    marker: &str,
    category: Category,
    inputs: &CategoryInputs,
    bonus: f64,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut session = EvaluationSession::default();

    if discount_rate <= -1.0 {
        bail!("discount rate must be greater than -1.0, got {discount_rate}");
    }
    let cash_flows = workbook::read_cash_flow(workbook, marker)?;
    let indicators = finance::analyze(&mut session, &cash_flows, discount_rate);
    print_indicators(&indicators);

    let score = compliance::apply(&mut session, category, inputs)?;
    print_compliance(category, score);

    let Some(record) = report::aggregate(&session, bonus) else {
        println!("{}", report::missing_data_notice());
        return Ok(());
    };

    print!("{}", report::build_summary(&record));

    let out = out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "green_bond_result_{}.csv",
            Local::now().date_naive()
        ))
    });
    workbook::write_result(&out, &record)?;
    println!("Result table written to {}.", out.display());

    Ok(())
}

fn run_checklist(
    workbook: &std::path::Path,
    sheet: Option<&str>,
    met: &[usize],
    out: &std::path::Path,
) -> anyhow::Result<()> {
    let Some(sheet) = sheet else {
        println!("Category sheets in {}:", workbook.display());
        for name in workbook::sheet_names(workbook)? {
            println!("- {name}");
        }
        return Ok(());
    };

    let mut items = workbook::read_checklist(workbook, sheet)?;
    let total = items.len();
    for position in met {
        if *position == 0 || *position > total {
            bail!(
                "--met position {position} is out of range \
                 (the sheet lists {total} requirements, positions are 1-based)"
            );
        }
        items[position - 1].met = true;
    }

    let satisfied = items.iter().filter(|item| item.met).count();
    let percentage = satisfied as f64 / total as f64 * 100.0;

    println!("Requirements in \"{sheet}\": {total}");
    for (position, item) in items.iter().enumerate() {
        let mark = if item.met { "x" } else { " " };
        println!("  [{mark}] {}. {}", position + 1, item.requirement);
    }
    println!("The project satisfies {percentage:.1}% of the requirements.");
    if percentage >= CHECKLIST_PASS_THRESHOLD {
        println!("The project meets the environmental criteria for a green bond.");
    } else {
        println!("The project does not yet meet enough environmental criteria.");
    }

    workbook::write_checklist(out, &items)?;
    println!("Checklist written to {}.", out.display());

    Ok(())
}

fn print_indicators(indicators: &FinancialIndicators) {
    println!("Net present value: {:.2}", indicators.npv);
    match indicators.irr {
        Some(irr) => println!("Internal rate of return: {:.2}%", irr * 100.0),
        None => println!("Internal rate of return: undetermined"),
    }
    match indicators.roi {
        Some(roi) => println!("Return on investment: {roi:.2}%"),
        None => println!("Return on investment: undetermined (no initial outlay)"),
    }
    match indicators.payback {
        Some(payback) => println!("Payback period: {payback} periods"),
        None => println!("Payback period: undetermined (never recovered)"),
    }
}

fn print_compliance(category: Category, score: ComplianceScore) {
    match score {
        ComplianceScore::Scored(value) => {
            println!("Environmental compliance for {category}: {value:.2}%");
        }
        ComplianceScore::Unsupported => {
            println!(
                "The category {category} has no scoring formula yet; \
                 no compliance score was recorded."
            );
        }
    }
}
