use corpus::Conference;

/// Characters of paper text considered when building the QA context.
const PREVIEW_CHARS: usize = 1000;

pub(crate) fn conference_description(conference: Conference) -> &'static str {
    match conference {
        Conference::Tmlr => {
            "TMLR is a machine learning research conference focusing on theoretical advances, \
             algorithms, and methodological innovations in machine learning."
        }
        Conference::Cvpr => {
            "CVPR is a premier computer vision conference focusing on visual processing, \
             recognition, understanding, and generation."
        }
        Conference::Emnlp => {
            "EMNLP is a natural language processing conference focusing on computational \
             linguistics, language understanding, and text processing."
        }
        Conference::Neurips => {
            "NeurIPS is a conference focusing on neural information processing systems, \
             machine learning theory, and artificial intelligence."
        }
        Conference::Kdd => {
            "KDD is a conference focusing on data mining, knowledge discovery, and \
             large-scale data analytics."
        }
    }
}

/// Title and abstract sliced out of the opening of the paper. The title is
/// the text before the first period of the newline-collapsed preview; the
/// abstract is the next two sentence fragments.
pub(crate) struct PaperSketch {
    pub title: String,
    pub abstract_text: String,
}

pub(crate) fn sketch_paper(content: &str) -> PaperSketch {
    let preview: String = content
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    let preview = preview.trim();

    let mut parts = preview.split('.');
    let title = parts.next().unwrap_or("").to_string();
    let abstract_text = parts.take(2).collect::<Vec<_>>().join(" ");
    PaperSketch {
        title,
        abstract_text,
    }
}

/// Assembles the QA context paragraph for one paper and conference.
pub(crate) fn build_context(sketch: &PaperSketch, conference: Conference) -> String {
    format!(
        "Paper Title: {}\nAbstract: {}\n\nConference Information: {}\n\n\
         A paper is relevant to a conference if its technical contributions and research focus \
         align with the conference's main themes. The explanation should describe specific \
         technical aspects of the paper that match the conference's focus areas.",
        sketch.title,
        sketch.abstract_text,
        conference_description(conference)
    )
}

/// The three questions posed per paper.
pub(crate) fn questions(conference: Conference) -> [String; 3] {
    let name = conference.as_str();
    [
        format!("What specific technical contributions make this paper relevant to {name}?"),
        format!("How does this paper's methodology align with {name}'s main themes?"),
        format!("What is the main innovation of this paper that fits {name}'s focus?"),
    ]
}
