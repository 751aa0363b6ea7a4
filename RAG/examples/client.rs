use reqwest::Client;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new();
    let base_url = std::env::var("CHAT_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

    println!("🔍 Testing chat API client");

    println!("\n📋 Health Check:");
    let health_response = client
        .get(format!("{}/health", base_url))
        .send()
        .await?;

    println!("Status: {}", health_response.status());
    let health_json: serde_json::Value = health_response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&health_json)?);

    for prompt in [
        "Hôm nay là ngày bao nhiêu?",
        "What is 2+2?",
        "Who is the current president of the United States?",
    ] {
        println!("\n💬 Prompt: {}", prompt);
        let chat_response = client
            .post(format!("{}/api/chat", base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;

        println!("Status: {}", chat_response.status());
        let chat_json: serde_json::Value = chat_response.json().await?;
        println!("Response: {}", serde_json::to_string_pretty(&chat_json)?);
    }

    println!("\n✅ Client test completed!");
    Ok(())
}
