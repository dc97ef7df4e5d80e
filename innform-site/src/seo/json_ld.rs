//! schema.org structured data.

use crate::config::SiteSettings;
use crate::models::Program;
use serde_json::{json, Value};

pub fn organization(site: &SiteSettings) -> Value {
    let base_url = site.base_url.trim_end_matches('/');
    let same_as: Vec<&str> = site.social_links.iter().map(|l| l.url.as_str()).collect();

    json!({
        "@context": "https://schema.org",
        "@type": "EducationalOrganization",
        "name": site.name,
        "url": format!("{}/", base_url),
        "email": site.contact_email,
        "telephone": site.phone,
        "address": {
            "@type": "PostalAddress",
            "streetAddress": site.address,
            "addressCountry": "IT"
        },
        "sameAs": same_as
    })
}

pub fn course(program: &Program, site: &SiteSettings) -> Value {
    let base_url = site.base_url.trim_end_matches('/');
    let mut course = json!({
        "@context": "https://schema.org",
        "@type": "Course",
        "courseCode": program.id,
        "name": program.title,
        "description": program.summary,
        "url": format!("{}{}", base_url, program.path()),
        "provider": {
            "@type": "EducationalOrganization",
            "name": site.name,
            "sameAs": format!("{}/", base_url)
        },
        "hasCourseInstance": {
            "@type": "CourseInstance",
            "courseMode": "Blended",
            "courseWorkload": format!("PT{}H", program.hours)
        }
    });

    if program.funded {
        course["isAccessibleForFree"] = Value::Bool(true);
    }
    course
}

pub fn faq_page(entries: &[(&str, &str)]) -> Value {
    let questions: Vec<Value> = entries
        .iter()
        .map(|(question, answer)| {
            json!({
                "@type": "Question",
                "name": question,
                "acceptedAnswer": { "@type": "Answer", "text": answer }
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": questions
    })
}

pub fn article(headline: &str, description: &str, path: &str, site: &SiteSettings) -> Value {
    let base_url = site.base_url.trim_end_matches('/');
    json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": headline,
        "description": description,
        "mainEntityOfPage": format!("{}{}", base_url, path),
        "author": { "@type": "Organization", "name": site.name },
        "publisher": { "@type": "Organization", "name": site.name }
    })
}

/// Serialize for an inline `<script type="application/ld+json">`.
///
/// `</` is escaped so no string value can close the script element.
pub fn to_script(block: &Value) -> String {
    block.to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::program::find_program;

    fn site() -> SiteSettings {
        SiteSettings {
            name: "Innform".to_string(),
            base_url: "https://www.innform.it".to_string(),
            default_title: "Innform".to_string(),
            default_description: "Corsi".to_string(),
            default_image: "/static/og-default.jpg".to_string(),
            locale: "it_IT".to_string(),
            contact_email: "info@innform.it".to_string(),
            phone: "+39 000 0000000".to_string(),
            address: "Via Roma 1, Napoli".to_string(),
            map_embed_url: String::new(),
            social_links: Vec::new(),
        }
    }

    #[test]
    fn funded_course_is_free() {
        let program = find_program("gol-turismo-001").unwrap();
        let block = course(program, &site());

        assert_eq!(block["@type"], "Course");
        assert_eq!(block["url"], "https://www.innform.it/corsi/gol-turismo-001");
        assert_eq!(block["isAccessibleForFree"], true);
        assert_eq!(block["hasCourseInstance"]["courseWorkload"], "PT120H");
    }

    #[test]
    fn faq_lists_every_question() {
        let block = faq_page(&[("Quanto costa?", "Nulla."), ("Dove?", "In sede.")]);
        assert_eq!(block["mainEntity"].as_array().unwrap().len(), 2);
        assert_eq!(block["mainEntity"][1]["acceptedAnswer"]["text"], "In sede.");
    }

    #[test]
    fn script_cannot_be_closed_early() {
        let block = json!({ "name": "</script><script>alert(1)</script>" });
        assert!(!to_script(&block).contains("</script>"));
    }
}
