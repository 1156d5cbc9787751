use tera::Tera;

// Templates are compiled into the binary so the server does not depend on
// its working directory.
lazy_static::lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        let result = tera.add_raw_templates(vec![
            ("layout.html", include_str!("../templates/layout.html")),
            ("error.html", include_str!("../templates/error.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("repositories/index.html", include_str!("../templates/repositories/index.html")),
            ("repositories/create.html", include_str!("../templates/repositories/create.html")),
            ("repositories/show.html", include_str!("../templates/repositories/show.html")),
            ("repositories/edit.html", include_str!("../templates/repositories/edit.html")),
        ]);
        if let Err(e) = result {
            tracing::error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
        tera
    };
}
