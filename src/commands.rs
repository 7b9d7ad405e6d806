use std::io::Write;

use anyhow::Result;
use tracing::warn;

use crate::models::{NewProject, Project};
use crate::service::{display_date, ProjectService, ServiceError};
use crate::ui::tracker::setup_guidance;

/// Fields accepted by the `add` command
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AddArgs {
    /// Project name
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub status: Option<String>,

    /// Project manager's name
    #[arg(long)]
    pub manager: Option<String>,

    /// Start date, usually YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<String>,

    /// End date, usually YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<String>,
}

impl From<AddArgs> for NewProject {
    fn from(args: AddArgs) -> Self {
        NewProject {
            title: Some(args.title),
            status: args.status,
            manager: args.manager,
            start_date: args.start_date,
            end_date: args.end_date,
        }
    }
}

pub async fn list(service: &dyn ProjectService, out: &mut impl Write) -> Result<()> {
    let projects = service.list_projects().await.map_err(|err| report(err, out))?;

    write_table(&projects, out)?;
    Ok(())
}

pub async fn add(service: &dyn ProjectService, args: AddArgs, out: &mut impl Write) -> Result<()> {
    let project = service
        .add_project(args.into())
        .await
        .map_err(|err| report(err, out))?;

    writeln!(out, "Added project {}", project.id)?;
    write_table(std::slice::from_ref(&project), out)?;
    Ok(())
}

/// Prints setup guidance for a missing list and turns the failure into an exit error
fn report(err: ServiceError, out: &mut impl Write) -> anyhow::Error {
    if let ServiceError::ListNotFound { list } = &err {
        for line in setup_guidance(list) {
            if let Err(write_err) = writeln!(out, "{}", line) {
                warn!(error = %write_err, "could not print setup guidance");
                break;
            }
        }
    }
    anyhow::Error::new(err)
}

fn write_table(projects: &[Project], out: &mut impl Write) -> Result<()> {
    if projects.is_empty() {
        writeln!(out, "No projects found.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<8} {:<30} {:<14} {:<22} {:<12} {:<12}",
        "ID", "Project Name", "Status", "Project Manager", "Start Date", "End Date"
    )?;
    for project in projects {
        writeln!(
            out,
            "{:<8} {:<30} {:<14} {:<22} {:<12} {:<12}",
            project.id,
            project.title,
            project.status,
            project.manager,
            display_date(&project.start_date),
            display_date(&project.end_date),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockProjectService;

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[tokio::test]
    async fn list_prints_one_line_per_project() {
        let service = MockProjectService::new("RevlonProjects".into());
        let mut buffer = Vec::new();
        list(&service, &mut buffer).await.unwrap();

        let text = output(buffer);
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("Q1 Product Launch"));
        assert!(text.contains("2024-03-30"));
    }

    #[tokio::test]
    async fn add_prints_the_created_project() {
        let service = MockProjectService::new("RevlonProjects".into());
        let mut buffer = Vec::new();
        let args = AddArgs {
            title: "Brand Refresh".into(),
            status: Some("Planning".into()),
            ..AddArgs::default()
        };
        add(&service, args, &mut buffer).await.unwrap();

        let text = output(buffer);
        assert!(text.starts_with("Added project "));
        assert!(text.contains("Brand Refresh"));
        assert!(text.contains("Planning"));
    }

    #[test]
    fn missing_list_prints_guidance() {
        let mut buffer = Vec::new();
        let err = report(
            ServiceError::ListNotFound {
                list: "RevlonProjects".into(),
            },
            &mut buffer,
        );

        assert!(output(buffer).contains("ProjectManager (Single line of text)"));
        assert!(err.to_string().contains("RevlonProjects"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unwritable_output_still_reports_missing_list() {
        let err = report(
            ServiceError::ListNotFound {
                list: "RevlonProjects".into(),
            },
            &mut ClosedPipe,
        );
        assert!(err.downcast_ref::<ServiceError>().unwrap().is_list_not_found());
    }

    #[test]
    fn other_errors_print_nothing_extra() {
        let mut buffer = Vec::new();
        let err = report(ServiceError::Other("boom".into()), &mut buffer);
        assert!(buffer.is_empty());
        assert_eq!(err.to_string(), "boom");
    }
}
