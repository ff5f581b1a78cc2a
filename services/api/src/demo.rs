use crate::infra::{build_service, demo_admin, parse_date, seed_demo_depot};
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use route_compliance::error::AppError;
use route_compliance::workflows::staffing::{
    can_approve, compute_status_from_str, ApprovalRequest, ComplianceStatus, ComplianceSummary,
    PolicyThresholds, RouteComplianceAlert, RouteView, StaffStatusView,
};

#[derive(Args, Debug)]
pub(crate) struct StatusArgs {
    /// Licence expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) license_expiry: String,
    /// Reference date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Days before expiry that count as expiring soon
    #[arg(long)]
    pub(crate) warning_days: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct ApprovalArgs {
    /// Planned journey time in minutes
    #[arg(long)]
    pub(crate) minutes: u32,
    /// Assigned staff status (compliant, expiring-soon, non-compliant); omit when unassigned
    #[arg(long, value_parser = parse_status)]
    pub(crate) staff_status: Option<ComplianceStatus>,
    /// Evaluate as an administrator
    #[arg(long)]
    pub(crate) admin: bool,
    /// Routes longer than this many minutes need a compliant driver
    #[arg(long)]
    pub(crate) long_route_minutes: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

fn parse_status(raw: &str) -> Result<ComplianceStatus, String> {
    ComplianceStatus::from_label(raw).ok_or_else(|| {
        format!("unknown status '{raw}' (expected compliant, expiring-soon, or non-compliant)")
    })
}

pub(crate) fn run_status_check(args: StatusArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let mut thresholds = PolicyThresholds::default();
    if let Some(days) = args.warning_days {
        thresholds.expiry_warning_days = days;
    }

    let status = compute_status_from_str(&args.license_expiry, as_of, &thresholds);
    println!(
        "Licence expiring {} is {} as of {}",
        args.license_expiry.trim(),
        status,
        as_of
    );
    Ok(())
}

pub(crate) fn run_approval_check(args: ApprovalArgs) -> Result<(), AppError> {
    let mut thresholds = PolicyThresholds::default();
    if let Some(minutes) = args.long_route_minutes {
        thresholds.long_route_minutes = minutes;
    }

    let request = ApprovalRequest {
        planned_journey_minutes: args.minutes,
        staff_status: args.staff_status,
    };
    let eligible = can_approve(&request, args.admin, &thresholds);
    let alert = RouteComplianceAlert::evaluate(&request, &thresholds);

    println!(
        "{}-minute route, staff {}: compliance check {}, approval {}",
        args.minutes,
        args.staff_status
            .map(|status| status.label())
            .unwrap_or("unassigned"),
        alert.label(),
        if eligible { "allowed" } else { "not allowed" }
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let service = build_service(PolicyThresholds::default());
    seed_demo_depot(&service, as_of, Utc::now())?;

    let admin = demo_admin();
    let staff = service.list_staff(as_of)?;
    let routes = service.list_routes(&admin, as_of)?;
    let summary = service.summary(as_of)?;

    println!("Route compliance demo (as of {as_of})");
    render_summary(&summary);
    render_staff(&staff);
    render_routes(&routes);

    println!("\nApproving every eligible route");
    for route in routes.iter().filter(|route| route.can_approve) {
        let approved = service.approve_route(&admin, &route.id, as_of, Utc::now())?;
        println!("- {} approved", approved.route_name);
    }

    let summary = service.summary(as_of)?;
    render_summary(&summary);
    Ok(())
}

fn render_summary(summary: &ComplianceSummary) {
    println!(
        "\nStaff: {} total, {} compliant, {} expiring soon, {} non-compliant",
        summary.total_staff, summary.compliant, summary.expiring_soon, summary.non_compliant
    );
    println!(
        "Routes: {} total, {} approved, {} pending",
        summary.total_routes, summary.approved_routes, summary.pending_routes
    );
}

fn render_staff(staff: &[StaffStatusView]) {
    println!("\nStaff compliance");
    if staff.is_empty() {
        println!("No staff records found.");
        return;
    }
    for member in staff {
        println!(
            "- {} ({}) | DBS {} | licence {} | {}",
            member.staff_name,
            member.role_label,
            member.dbs_expiry_date,
            member.license_expiry_date,
            member.status_label
        );
    }
}

fn render_routes(routes: &[RouteView]) {
    println!("\nRoutes");
    if routes.is_empty() {
        println!("No routes found.");
        return;
    }
    for route in routes {
        let state = if route.approved {
            "approved"
        } else if route.can_approve {
            "ready to approve"
        } else {
            "blocked"
        };
        println!(
            "- {} | {} minutes | staff {} | compliance {} | {}",
            route.route_name,
            route.planned_journey_minutes,
            route.staff_name,
            route.compliance_alert_label,
            state
        );
    }
}
