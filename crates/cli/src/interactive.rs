use noetic_core::NoeticService;
use noetic_search::types::SearchRequest;
use rustyline::DefaultEditor;

pub async fn run(service: &NoeticService, namespace: &str) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("noetic-cache interactive mode, namespace={namespace}");
    println!("type a query, or 'exit'");

    loop {
        let readline = rl.readline("noetic> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" {
                    break;
                }
                rl.add_history_entry(line)?;
                if let Err(e) = process_query(service, namespace, line).await {
                    eprintln!("error: {e}");
                }
            }
            Err(_) => break,
        }
    }

    Ok(())
}

async fn process_query(service: &NoeticService, namespace: &str, query: &str) -> anyhow::Result<()> {
    let request = SearchRequest::new(query);
    let response = service.web_search.search(&request, namespace).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
