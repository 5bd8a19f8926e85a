/// Knobs for one landing page instance.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Id of the add control in the page markup.
    pub add_control_id: String,
    /// Selector of the element documents are rendered into.
    pub container: String,
    /// Stylesheet requested as soon as the page is built.
    pub stylesheet: String,
    /// Scripts the document manager needs before it can be instantiated.
    pub manager_scripts: Vec<String>,
    /// Scripts needed to render documents.
    pub document_scripts: Vec<String>,
    /// Capacity of the bounded popup channel.
    pub popup_capacity: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            add_control_id: "add-card".to_string(),
            container: "main".to_string(),
            stylesheet: "style/templates/document-template.css".to_string(),
            manager_scripts: vec![
                "js/model/version.js".to_string(),
                "js/model/document.js".to_string(),
                "js/manager/document-manager.js".to_string(),
            ],
            document_scripts: vec!["js/templates/document-template.js".to_string()],
            popup_capacity: 32,
        }
    }
}
