use crate::{
    renderer::{event_struct_name, Renderer, TargetDescriptor},
    types::{FieldType, Qualifier, RootEntry, Struct, Variable},
    utils::quote,
};

/// C# proxy on top of LitJson and the Pomelo .NET client.
pub static CSHARP: TargetDescriptor = TargetDescriptor {
    id:              "csharp",
    lang_name:       "C#",
    file_extension:  ".cs",
    scalar_types:    ["int", "int", "int", "float", "double", "string"],
    scalar_defaults: ["0", "0", "0", "0.0f", "0.0", "\"\""],
    message_default: "null",
    comment_prefix:  "///",
    namespace_begin: "namespace ",
    includes:        "using System;\nusing LitJson;\nusing Pomelo.DotNetClient;\n",
};

#[derive(Debug, Default)]
pub struct CSharpRenderer;

impl CSharpRenderer {
    pub fn new() -> Self {
        CSharpRenderer
    }

    /// `T name` for a call argument; repeated fields become arrays.
    fn argument(&self, var: &Variable) -> String {
        let ty = self.descriptor().type_name(&var.type_);
        match var.qualifier {
            Qualifier::Repeated => format!("{}[] {}", ty, var.name),
            _ => format!("{} {}", ty, var.name),
        }
    }
}

/// Serializes an array field element by element into a fresh JSON array.
fn to_json_array(name: &str, is_message: bool) -> String {
    let element = if is_message {
        format!("{}[i].ToJson()", name)
    } else {
        format!("{}[i]", name)
    };
    format!(
        "if({name} != null){{data[\"{name}\"] = new JsonData();for(int i=0;i<{name}.Length;++i){{data[\"{name}\"].Add({element});}}}}",
        name = name,
        element = element,
    )
}

/// Allocates `target.name` sized to the incoming array and fills it, only when the
/// payload carries a non-empty array.
fn from_json_array(var: &Variable, type_name: &str, target: &str) -> String {
    let name = &var.name;
    let element = if var.type_.is_message() {
        format!(
            "{target}.{name}[i] = new {ty}();{target}.{name}[i].FromJson(ret[\"{name}\"][i]);",
            target = target,
            name = name,
            ty = type_name,
        )
    } else {
        format!(
            "{target}.{name}[i]=({ty})ret[\"{name}\"][i];",
            target = target,
            name = name,
            ty = type_name,
        )
    };
    format!(
        "if(ret.ContainsKey(\"{name}\") && ret[\"{name}\"].IsArray && ret[\"{name}\"].Count > 0){{{target}.{name} = new {ty}[ret[\"{name}\"].Count];for(int i=0;i<ret[\"{name}\"].Count;++i){{{element}}}}}",
        name = name,
        target = target,
        ty = type_name,
        element = element,
    )
}

impl Renderer for CSharpRenderer {
    fn descriptor(&self) -> &TargetDescriptor {
        &CSHARP
    }

    fn field(&self, var: &Variable) -> String {
        format!("public {};", self.argument(var))
    }

    fn to_json_body(&self, vars: &[Variable]) -> String {
        let mut body = String::new();
        for var in vars {
            let name = &var.name;
            match (&var.type_, var.qualifier) {
                (ty, Qualifier::Repeated) => body.push_str(&to_json_array(name, ty.is_message())),
                (FieldType::Message(_), Qualifier::Optional) => body.push_str(&format!(
                    "if({name} != null){{data[\"{name}\"]={name}.ToJson();}}",
                    name = name
                )),
                (FieldType::Message(_), Qualifier::Required) => {
                    body.push_str(&format!("data[\"{name}\"]={name}.ToJson();", name = name))
                }
                (FieldType::Scalar(_), _) => {
                    body.push_str(&format!("data[\"{name}\"] = {name};", name = name))
                }
            }
        }
        body
    }

    fn from_json_body(&self, vars: &[Variable], target: &str) -> String {
        let mut body = String::new();
        for var in vars {
            let name = &var.name;
            let ty = self.descriptor().type_name(&var.type_);
            match (&var.type_, var.qualifier) {
                (_, Qualifier::Repeated) => body.push_str(&from_json_array(var, ty, target)),
                (FieldType::Message(_), _) => body.push_str(&format!(
                    "if(ret.ContainsKey(\"{name}\")){{{target}.{name} = new {ty}();{target}.{name}.FromJson(ret[\"{name}\"]);}}",
                    name = name,
                    target = target,
                    ty = ty,
                )),
                (FieldType::Scalar(_), _) => body.push_str(&format!(
                    "{target}.{name}= ret.ContainsKey(\"{name}\")?({ty})ret[\"{name}\"]:{default};",
                    target = target,
                    name = name,
                    ty = ty,
                    default = self.descriptor().default_value(&var.type_),
                )),
            }
        }
        body
    }

    fn message(&self, message: &Struct) -> String {
        let mut code = format!("public class {}{{", message.name);
        for nested in message.structs.values() {
            code.push_str(&self.message(nested));
        }
        for var in &message.vars {
            code.push_str(&self.field(var));
        }
        code.push_str("public JsonData ToJson(){JsonData data = new JsonData();");
        code.push_str(&self.to_json_body(&message.vars));
        code.push_str("return data;}");
        code.push_str("public void FromJson(JsonData ret){");
        code.push_str(&self.from_json_body(&message.vars, "this"));
        code.push('}');
        code.push('}');
        code
    }

    fn call_stub(&self, entry: &RootEntry, response: Option<&Struct>) -> String {
        let mut args: Vec<String> = entry
            .vars
            .iter()
            .filter(|var| var.qualifier != Qualifier::Optional)
            .map(|var| self.argument(var))
            .collect();
        args.extend(
            entry
                .vars
                .iter()
                .filter(|var| var.qualifier == Qualifier::Optional)
                .map(|var| format!("{}={}", self.argument(var), self.descriptor().default_value(&var.type_))),
        );
        if let Some(response) = response {
            args.push(format!("System.Action<{}> cb", response.name));
        }

        let mut code = format!("public static bool {}({}){{", entry.method, args.join(","));
        code.push_str("JsonData data = new JsonData();");
        code.push_str(&self.to_json_body(&entry.vars));
        match response {
            Some(response) => code.push_str(&format!(
                "pc.request({router}, data, delegate (JsonData ret){{{ty} result = new {ty}();result.FromJson(ret);cb(result);}});",
                router = quote(&entry.router),
                ty = response.name,
            )),
            None => code.push_str(&format!("pc.notify({}, data);", quote(&entry.router))),
        }
        code.push_str("return true;}");
        code
    }

    fn event_stub(&self, entry: &RootEntry) -> String {
        format!(
            "public static bool {method}(System.Action<{ty}> cb){{pc.on({router}, delegate (JsonData ret){{{ty} result = new {ty}();result.FromJson(ret);cb(result);}});return true;}}",
            method = entry.method,
            ty = event_struct_name(entry),
            router = quote(&entry.router),
        )
    }

    fn class(&self, name: &str, body: &str) -> String {
        format!("public class {}{{public static PomeloClient pc = null;{}}}", name, body)
    }

    fn events_class(&self, body: &str) -> String {
        self.class("ServerEvent", body)
    }

    fn namespace(&self, name: &str, body: &str) -> String {
        format!("{}{}{{{}}}", self.descriptor().namespace_begin, name, body)
    }
}
