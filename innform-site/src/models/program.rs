use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramCategory {
    /// Publicly funded active-labour-policy course (Garanzia Occupabilità Lavoratori).
    Gol,
    Master,
    Course,
}

impl ProgramCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ProgramCategory::Gol => "Percorso GOL",
            ProgramCategory::Master => "Master",
            ProgramCategory::Course => "Corso",
        }
    }

    /// GOL and Master programs go through pre-enrollment and a later check.
    pub fn requires_pre_enrollment(&self) -> bool {
        matches!(self, ProgramCategory::Gol | ProgramCategory::Master)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub id: &'static str,
    pub title: &'static str,
    pub category: ProgramCategory,
    pub hours: u32,
    pub summary: &'static str,
    pub funded: bool,
}

impl Program {
    pub fn path(&self) -> String {
        format!("/corsi/{}", self.id)
    }
}

static CATALOG: &[Program] = &[
    Program {
        id: "gol-turismo-001",
        title: "Operatore dei servizi turistici e di accoglienza",
        category: ProgramCategory::Gol,
        hours: 120,
        summary: "Accoglienza, front office e promozione del territorio. Percorso gratuito per i beneficiari GOL.",
        funded: true,
    },
    Program {
        id: "gol-digitale-002",
        title: "Competenze digitali per l'ufficio",
        category: ProgramCategory::Gol,
        hours: 80,
        summary: "Strumenti di produttività, posta elettronica, cloud e sicurezza informatica di base.",
        funded: true,
    },
    Program {
        id: "gol-logistica-003",
        title: "Addetto alla logistica e al magazzino",
        category: ProgramCategory::Gol,
        hours: 100,
        summary: "Gestione delle scorte, movimentazione merci e software gestionali di magazzino.",
        funded: true,
    },
    Program {
        id: "master-hr-001",
        title: "Master in gestione delle risorse umane",
        category: ProgramCategory::Master,
        hours: 300,
        summary: "Selezione, amministrazione del personale e sviluppo organizzativo, con stage finale.",
        funded: false,
    },
    Program {
        id: "master-marketing-002",
        title: "Master in digital marketing",
        category: ProgramCategory::Master,
        hours: 250,
        summary: "Strategia digitale, social media, SEO e analisi dei dati di campagna.",
        funded: false,
    },
    Program {
        id: "corso-haccp-001",
        title: "HACCP per alimentaristi",
        category: ProgramCategory::Course,
        hours: 12,
        summary: "Igiene e sicurezza alimentare secondo la normativa vigente, con attestato.",
        funded: false,
    },
    Program {
        id: "corso-sicurezza-002",
        title: "Sicurezza sul lavoro: formazione generale",
        category: ProgramCategory::Course,
        hours: 4,
        summary: "Formazione generale dei lavoratori ai sensi del D.Lgs. 81/08.",
        funded: false,
    },
];

pub fn catalog() -> &'static [Program] {
    CATALOG
}

pub fn find_program(id: &str) -> Option<&'static Program> {
    CATALOG.iter().find(|program| program.id == id)
}

/// Programs offered through the pre-enrollment form.
pub fn pre_enrollable() -> impl Iterator<Item = &'static Program> {
    CATALOG
        .iter()
        .filter(|program| program.category.requires_pre_enrollment())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = catalog().iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn finds_gol_program() {
        let program = find_program("gol-turismo-001").unwrap();
        assert_eq!(program.category, ProgramCategory::Gol);
        assert_eq!(program.path(), "/corsi/gol-turismo-001");
        assert!(find_program("unknown").is_none());
    }

    #[test]
    fn short_courses_are_not_pre_enrollable() {
        assert!(pre_enrollable().all(|p| p.category != ProgramCategory::Course));
        assert!(pre_enrollable().any(|p| p.id == "master-hr-001"));
    }
}
