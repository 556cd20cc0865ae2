//! Font databases for SVG parsing and text rasterization.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use usvg::fontdb;

/// Extra font directory loaded alongside the system fonts.
pub const FONT_DIR_ENV: &str = "SCENEFORGE_FONT_DIR";

/// System fonts (plus [`FONT_DIR_ENV`]), loaded once per process.
pub fn system_fontdb() -> Arc<fontdb::Database> {
    static DB: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = std::env::var_os(FONT_DIR_ENV) {
            load_fonts_from_dir(&mut db, Path::new(&dir));
        }
        Arc::new(db)
    })
    .clone()
}

/// System fonts plus one embedded font. Returns the database and the family name the embedded
/// font registered under, if it parsed.
pub fn fontdb_with(font: &[u8]) -> (Arc<fontdb::Database>, Option<String>) {
    let mut db = system_fontdb().as_ref().clone();
    let ids = db.load_font_source(fontdb::Source::Binary(Arc::new(font.to_vec())));
    let family = ids
        .first()
        .and_then(|id| db.face(*id))
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone());
    (Arc::new(db), family)
}

/// Load every `.ttf`/`.otf`/`.ttc` file in `dir` into `db`. Unreadable files are skipped.
pub fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

/// Parse options wired to `db`, falling back to any installed face when nothing matches.
pub fn svg_options(db: Arc<fontdb::Database>) -> usvg::Options<'static> {
    usvg::Options {
        fontdb: db,
        font_resolver: make_svg_font_resolver(),
        ..Default::default()
    }
}

fn make_svg_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, db| {
            let mut families = Vec::<fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => fontdb::Family::Name(s),
                });
            }
            families.push(fontdb::Family::SansSerif);
            families.push(fontdb::Family::Serif);

            let style = match font.style() {
                usvg::FontStyle::Normal => fontdb::Style::Normal,
                usvg::FontStyle::Italic => fontdb::Style::Italic,
                usvg::FontStyle::Oblique => fontdb::Style::Oblique,
            };

            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = db.query(&query) {
                return Some(id);
            }
            db.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}
