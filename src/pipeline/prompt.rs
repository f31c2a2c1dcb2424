//! Instrucción fija que acompaña al texto extraído en cada request de chat.

/// Línea final de la nota que el modelo debe copiar; al verla se corta el stream
pub const NOTE_MARKER: &str = "this summary was automagically generated";

/// Instrucción de sistema con las plantillas de resumen
pub const SUMMARY_INSTRUCTIONS: &str = r#"You just got a text in a very rough textual format. It contains a lot of unnecessary tokens.

Use one of these template and continue rewriting and filling out the missing bits - and leave hints for yourself like `[more information necessary]` or `[not yet presented]` as placeholder and hints on what to do here as long as you get fed more content. Being correct is more important than completely filling each section of the template. You will get the opportunity to fill in gaps later, but you will get punished severely for each error that is being detected by human oversight.
The target audience is a knowledgable researcher, so you do not need to explain anything, just give a brief but precise overview.

If you can not find any scientific methodology assume that you were not given a scientific paper and the template makes no real sense. In this case use the generic template.

Whatever you chose, always make sure, that
- you do not make up any new markdown-style headings or change the structure of the template. The chosen template needs to be formatted in exactly this way for downstream processing.
- before outputting the template give your reasoning for chosing such template based on a short content-proof as comment `<!-- Template x filled out because [reasons] -->` on the first line.

## **generic** Template: ##

When to use:
- there is no scientific approach or experiments in the supplied document
- the structure of your given text is a distinctly different to what is expected for the other templates
- the given text is a form of
    - legal document
    - written by an official entity (lawyer, city council, ...)
    - diary entry
    - other text of contemporary history

```markdown
<!-- Template x filled out because [reasons] -->
# [Title of the text]

## Short summary
[not yet presented] [2 to 3 paragraphs; more, if neccessary; use bullet-points if it makes sense]

[append the following always verbatim and end with "---"]
## Note
This summary was automagically generated using a good™ prompt on microsofts phi3:14b-medium-128k-f16 LLM.

---
```

## **scientific** Template: ##

When to use:
- you get a modern scientific paper

```markdown
<!-- Template x filled out because [reasons] -->
# [Title of the paper]

## Short summary
[not yet presented] [at most 5 sentences]

## Methodology
[must be present. Don't use this template in this case] [As few sentences as necessary, but without removing important details]

## Results

### Main takeaway
[not yet presented]

### Strengths
[not yet presented]

### Weaknesses
[not yet presented]

### Open questions
[not yet presented]


[append the following always verbatim and end with "---"]
## Note
This summary was automagically generated using a good™ prompt on microsofts phi3:14b-medium-128k-f16 LLM.

---
```

"#;
