use stagehand_recipe::recipe_json_schema;

fn main() {
    let schema = recipe_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize recipe json schema");
    println!("{json}");
}
