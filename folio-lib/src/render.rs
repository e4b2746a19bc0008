use crate::portfolio::Portfolio;

/// Turns a portfolio into a presentable document. Layout belongs entirely to the renderer.
pub trait Renderer {
    type Output;

    fn render(&self, portfolio: &Portfolio) -> Self::Output;
}

/// Renders a portfolio as a plain text page, section by section. Empty sections are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl Renderer for PlainTextRenderer {
    type Output = String;

    fn render(&self, portfolio: &Portfolio) -> String {
        let mut lines = Vec::new();
        let about = &portfolio.about;

        lines.push(about.name.clone());
        if !about.tagline.is_empty() {
            lines.push(about.tagline.clone());
        }
        if !about.description.is_empty() {
            lines.push(String::new());
            lines.push(about.description.clone());
        }

        if !portfolio.skills.is_empty() {
            lines.push(String::new());
            lines.push("Skills".to_string());
            lines.push(portfolio.skills.join(", "));
        }

        if !portfolio.projects.is_empty() {
            lines.push(String::new());
            lines.push("Projects".to_string());
            for project in &portfolio.projects {
                lines.push(format!("- {} ({})", project.title, project.link));
                if !project.description.is_empty() {
                    lines.push(format!("  {}", project.description));
                }
            }
        }

        if !portfolio.experiences.is_empty() {
            lines.push(String::new());
            lines.push("Experience".to_string());
            for experience in &portfolio.experiences {
                lines.push(format!(
                    "- {} at {}, {}",
                    experience.job_role, experience.company_name, experience.job_duration
                ));
                if let Some(start) = experience.start_date {
                    let end = experience
                        .end_date
                        .map_or_else(|| "present".to_string(), |d| d.to_string());
                    lines.push(format!("  {start} to {end}"));
                }
                if !experience.job_description.is_empty() {
                    lines.push(format!("  {}", experience.job_description));
                }
            }
        }

        let contact = &portfolio.contact;
        lines.push(String::new());
        lines.push("Contact".to_string());
        if !contact.email.is_empty() {
            lines.push(format!("Email: {}", contact.email));
        }
        if !contact.phone.is_empty() {
            lines.push(format!("Phone: {}", contact.phone));
        }
        for (platform, url) in contact.socials.iter().filter(|(_, url)| !url.is_empty()) {
            lines.push(format!("{platform}: {url}"));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
