use crate::infra::{
    parse_group, parse_side, synthesize_photo, FixtureImageSource, InMemoryVerificationAuthority,
};
use campus_verify::config::AppConfig;
use campus_verify::error::AppError;
use campus_verify::workflows::verification::{
    AccountOverview, CaptureChannel, CaptureOutcome, DocumentGroupName, DocumentSide,
    DriverStanding, EligibilityGate, FileImageCodec, FlowEntry, ImageNormalizationPipeline,
    NormalizeRequest, StatusTier, StatusTierResolver, StudentAction, SubmissionCoordinator,
    VerificationError, VerificationFlow, VerificationKind,
};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory for generated photos and transcoded output (defaults to the configured media dir)
    #[arg(long)]
    pub(crate) workdir: Option<PathBuf>,
    /// Have the reviewer reject the first student submission before approving a resubmission
    #[arg(long)]
    pub(crate) reject_first: bool,
    /// Also attach the optional vehicle authorization letter
    #[arg(long)]
    pub(crate) with_authorization: bool,
}

#[derive(Args, Debug)]
pub(crate) struct NormalizeArgs {
    /// Photo to normalize: JPEG, PNG, GIF, BMP, TIFF or WebP.
    /// HEIC/HEIF photos are not decoded and fail; export them as JPEG first.
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Document the photo belongs to
    /// (studentId, license, vehicleRegistration, vehicleAuthorization)
    #[arg(long, value_parser = parse_group, default_value = "studentId")]
    pub(crate) document: DocumentGroupName,
    /// Document side (front or back)
    #[arg(long, value_parser = parse_side, default_value = "front")]
    pub(crate) side: DocumentSide,
    /// Override the output directory for the transcoded JPEG
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct StatusArgs {
    /// Raw status string as returned by the authority (omit for "no record")
    pub(crate) raw: Option<String>,
}

pub(crate) async fn run_normalize(args: NormalizeArgs, config: &AppConfig) -> Result<(), AppError> {
    let NormalizeArgs {
        input,
        document,
        side,
        output_dir,
    } = args;

    let output_dir = output_dir.unwrap_or_else(|| config.media.output_dir.clone());
    let pipeline = ImageNormalizationPipeline::new(Arc::new(FileImageCodec::new(output_dir)));
    let normalized = pipeline
        .normalize(
            &input.display().to_string(),
            NormalizeRequest { document, side },
        )
        .await
        .map_err(VerificationError::from)?;

    match serde_json::to_string_pretty(&normalized) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Normalized image descriptor unavailable: {err}"),
    }
    Ok(())
}

pub(crate) fn run_status(args: StatusArgs) {
    let tier = StatusTierResolver::resolve(args.raw.as_deref());
    println!(
        "Status {:?} -> {}",
        args.raw.as_deref().unwrap_or("<none>"),
        tier
    );
    println!(
        "- Accepts a new submission: {}",
        if tier.accepts_submission() { "yes" } else { "no" }
    );
    let driver = EligibilityGate::evaluate(VerificationKind::Driver, tier);
    match driver.reason() {
        None => println!("- Driver verification: available"),
        Some(reason) => println!("- Driver verification: blocked ({})", reason.explanation()),
    }
}

pub(crate) async fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let DemoArgs {
        workdir,
        reject_first,
        with_authorization,
    } = args;

    let workdir = workdir.unwrap_or_else(|| config.media.output_dir.join("demo"));
    let photos = workdir.join("photos");
    let authority = Arc::new(InMemoryVerificationAuthority::default());
    let source = Arc::new(FixtureImageSource::default());
    let pipeline = Arc::new(ImageNormalizationPipeline::new(Arc::new(
        FileImageCodec::new(workdir.join("normalized")),
    )));
    let coordinator = SubmissionCoordinator::new(authority.clone());
    info!(workdir = %workdir.display(), "starting verification demo");

    println!("Campus verification demo");
    render_overview(&AccountOverview::load(authority.as_ref()).await);

    println!("\nAttempting driver verification before student approval");
    let tiers = AccountOverview::load(authority.as_ref()).await;
    match VerificationFlow::open(
        VerificationKind::Driver,
        tiers.student_tier(),
        tiers.driver_tier(),
        pipeline.clone(),
        source.clone(),
    ) {
        Err(err) => println!("  {}", err.user_message()),
        Ok(_) => println!("  Driver flow unexpectedly opened"),
    }

    let rounds: &[(&str, Option<&str>)] = if reject_first {
        &[("rejected", Some("Photo is too blurry to read")), ("approved", None)]
    } else {
        &[("approved", None)]
    };
    for (decision, reason) in rounds {
        println!("\nStudent ID submission");
        let overview = AccountOverview::load(authority.as_ref()).await;
        let groups = [DocumentGroupName::StudentId];
        let Some(message) = run_flow(
            VerificationKind::Student,
            &overview,
            &groups,
            &photos,
            &pipeline,
            &source,
            &coordinator,
        )
        .await?
        else {
            return Ok(());
        };
        println!("  {message}");

        authority.decide(VerificationKind::Student, decision, *reason);
        println!("  Reviewer marked the student record as '{decision}'");
        render_overview(&AccountOverview::load(authority.as_ref()).await);
    }

    println!("\nDriver documents submission");
    let overview = AccountOverview::load(authority.as_ref()).await;
    let mut groups = vec![
        DocumentGroupName::License,
        DocumentGroupName::VehicleRegistration,
    ];
    if with_authorization {
        groups.push(DocumentGroupName::VehicleAuthorization);
    }
    if let Some(message) = run_flow(
        VerificationKind::Driver,
        &overview,
        &groups,
        &photos,
        &pipeline,
        &source,
        &coordinator,
    )
    .await?
    {
        println!("  {message}");
    }
    render_overview(&AccountOverview::load(authority.as_ref()).await);

    Ok(())
}

/// Opens, fills and submits one flow. `None` when the flow was not open for capture.
async fn run_flow(
    kind: VerificationKind,
    overview: &AccountOverview,
    groups: &[DocumentGroupName],
    photos: &Path,
    pipeline: &Arc<ImageNormalizationPipeline<FileImageCodec>>,
    source: &Arc<FixtureImageSource>,
    coordinator: &SubmissionCoordinator<InMemoryVerificationAuthority>,
) -> Result<Option<String>, AppError> {
    let own_tier = match kind {
        VerificationKind::Student => overview.student_tier(),
        VerificationKind::Driver => overview.driver_tier(),
    };
    let entry = VerificationFlow::open(
        kind,
        overview.student_tier(),
        own_tier,
        pipeline.clone(),
        source.clone(),
    );
    let mut flow = match entry {
        Ok(FlowEntry::Capture(flow)) => flow,
        Ok(FlowEntry::ViewOnly { tier, .. }) => {
            println!("  {kind} verification is {tier}; nothing to submit");
            return Ok(None);
        }
        Err(err) => {
            println!("  {}", err.user_message());
            return Ok(None);
        }
    };

    for group in groups {
        for side in DocumentSide::BOTH {
            source.push(synthesize_photo(photos, *group, side, 3024, 4032)?);
            match flow.capture(*group, side, CaptureChannel::Camera).await? {
                CaptureOutcome::Recorded { image, .. } => println!(
                    "  - {} {}: {} ({}x{}, {} KiB)",
                    group.description(),
                    side,
                    image.file_name,
                    image.width,
                    image.height,
                    image.byte_size / 1024
                ),
                CaptureOutcome::Cancelled => println!("  - {} {}: cancelled", group, side),
            }
        }
    }

    let outcome = flow.submit(coordinator).await?;
    if let Some(tier) = outcome.tier() {
        println!("  Status after submission: {tier}");
    }
    Ok(Some(outcome.message))
}

fn render_overview(overview: &AccountOverview) {
    println!("Account overview");
    let student = match overview.student_action() {
        StudentAction::Submit => "not submitted, submit your student ID".to_string(),
        StudentAction::AwaitReview => "pending review".to_string(),
        StudentAction::ViewStatus => "verified".to_string(),
        StudentAction::Resubmit { reason } => format!("rejected ({reason}), please resubmit"),
    };
    println!("- Student: {student}");
    match overview.driver_standing() {
        DriverStanding::Locked => println!("- Driver: locked until student verification"),
        DriverStanding::Tier(StatusTier::NotSubmitted) => println!("- Driver: available"),
        DriverStanding::Tier(tier) => println!("- Driver: {tier}"),
    }

    let history = overview.history();
    if history.is_empty() {
        return;
    }
    println!("- History:");
    for entry in history {
        match entry.rejection_reason {
            Some(reason) => println!(
                "    {} | {} | {} ({})",
                entry.created_at, entry.label, entry.tier, reason
            ),
            None => println!("    {} | {} | {}", entry.created_at, entry.label, entry.tier),
        }
    }
}
