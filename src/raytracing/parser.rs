use thiserror::Error;

use super::{
    core::{RenderSettings, Scene},
    math::Vec3,
    solid::{Material, SceneObject, Solid},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePosition {
    pub line: u32,
    pub column: u32,
}

#[derive(Error, Debug)]
#[error("{message} at {}:{}", .position.line + 1, .position.column + 1)]
pub struct ParserError {
    pub position: FilePosition,
    pub message: String,
}

impl ParserError {
    /// Prints the error followed by the offending line and a caret under the column.
    pub fn print_error_location(&self, content: &str) {
        eprintln!("{}", self);
        if let Some(line) = content.lines().nth(self.position.line as usize) {
            eprintln!("{}", line);
            let spacing = " ".repeat(self.position.column as usize);
            eprintln!("{}^", spacing);
        }
    }
}

pub type ParserResult<T> = Result<T, ParserError>;

/// Everything a scene file describes.
#[derive(Debug)]
pub struct SceneDescription {
    pub settings: RenderSettings,
    pub camera_position: Vec3,
    pub scene: Scene,
}

/// Recursive descent parser over a whitespace separated token stream.
/// `#` starts a comment running to the end of the line.
pub struct SceneParser {
    chars: Vec<char>,
    index: usize,
    position: FilePosition,
    peeked: Option<(String, FilePosition)>,
}

impl SceneParser {
    pub fn new(content: &str) -> SceneParser {
        SceneParser {
            chars: content.chars().collect(),
            index: 0,
            position: FilePosition { line: 0, column: 0 },
            peeked: None,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 0;
            } else {
                self.position.column += 1;
            }
            self.index += 1;
        }
    }

    fn eat_spaces(&mut self) {
        while let Some(c) = self.current_char() {
            if c == '#' {
                while matches!(self.current_char(), Some(c) if c != '\n') {
                    self.advance();
                }
            } else if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn read_token(&mut self) -> (String, FilePosition) {
        self.eat_spaces();
        let start = self.position;
        let mut token = String::new();
        let Some(first) = self.current_char() else {
            return (token, start);
        };
        match first {
            '(' | ')' | ',' => {
                token.push(first);
                self.advance();
            }
            '.' | '+' | '-' | '0'..='9' => {
                while let Some(c) = self.current_char() {
                    let exponent_sign =
                        (c == '+' || c == '-') && token.ends_with(|p: char| p == 'e' || p == 'E');
                    let numeric = c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E';
                    if numeric || exponent_sign || token.is_empty() {
                        token.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            _ => {
                while let Some(c) = self.current_char() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    token.push(c);
                    self.advance();
                }
                if token.is_empty() {
                    // unknown symbol, return it alone so the error points at it
                    token.push(first);
                    self.advance();
                }
            }
        }
        (token, start)
    }

    fn pop(&mut self) -> (String, FilePosition) {
        match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.read_token(),
        }
    }

    fn peek(&mut self) -> &str {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_token());
        }
        self.peeked.as_ref().map(|(token, _)| token.as_str()).unwrap_or("")
    }

    fn peek_position(&mut self) -> FilePosition {
        self.peek();
        self.peeked
            .as_ref()
            .map(|(_, position)| *position)
            .unwrap_or(self.position)
    }

    fn is_empty(&mut self) -> bool {
        self.peek().is_empty()
    }

    fn error_at<T>(&self, message: String, position: FilePosition) -> ParserResult<T> {
        Err(ParserError { position, message })
    }

    fn maybe_match(&mut self, expected: &str) -> bool {
        if self.peek() == expected {
            self.pop();
            true
        } else {
            false
        }
    }

    fn match_token(&mut self, expected: &str) -> ParserResult<()> {
        let (token, position) = self.pop();
        if token != expected {
            let message = format!("expected '{}', getting '{}' instead", expected, token);
            return self.error_at(message, position);
        }
        Ok(())
    }

    fn parse_float(&mut self) -> ParserResult<f64> {
        let (token, position) = self.pop();
        match token.parse::<f64>() {
            Ok(num) if num.is_finite() => Ok(num),
            _ => {
                let message = format!("cannot interpret '{}' as a number", token);
                self.error_at(message, position)
            }
        }
    }

    fn parse_unsigned(&mut self) -> ParserResult<u32> {
        let (token, position) = self.pop();
        match token.parse::<u32>() {
            Ok(num) if num > 0 => Ok(num),
            _ => {
                let message = format!("expected a positive integer, getting '{}'", token);
                self.error_at(message, position)
            }
        }
    }

    fn parse_vec3(&mut self) -> ParserResult<Vec3> {
        self.match_token("(")?;
        let x = self.parse_float()?;
        self.match_token(",")?;
        let y = self.parse_float()?;
        self.match_token(",")?;
        let z = self.parse_float()?;
        self.match_token(")")?;
        Ok(Vec3::new(x, y, z))
    }

    fn parse_color(&mut self) -> ParserResult<Vec3> {
        let named = match self.peek() {
            "red" => Some(Vec3::new(1.0, 0.0, 0.0)),
            "green" => Some(Vec3::new(0.0, 1.0, 0.0)),
            "blue" => Some(Vec3::new(0.0, 0.0, 1.0)),
            "white" => Some(Vec3::new(1.0, 1.0, 1.0)),
            "black" => Some(Vec3::new(0.0, 0.0, 0.0)),
            "grey" | "gray" => Some(Vec3::new(0.5, 0.5, 0.5)),
            "cyan" => Some(Vec3::new(0.0, 1.0, 1.0)),
            "violet" => Some(Vec3::new(1.0, 0.0, 1.0)),
            "yellow" => Some(Vec3::new(1.0, 1.0, 0.0)),
            "orange" => Some(Vec3::new(0.98, 0.45, 0.02)),
            _ => None,
        };
        match named {
            Some(color) => {
                self.pop();
                Ok(color)
            }
            None => self.parse_vec3(),
        }
    }

    fn parse_material(&mut self) -> ParserResult<Material> {
        let mut material = Material::default();
        loop {
            if self.maybe_match("color") {
                material.surface_color = self.parse_color()?;
            } else if self.maybe_match("reflect") {
                material = material.with_reflectivity(self.parse_float()?);
            } else if self.maybe_match("transparent") {
                material = material.with_transparency(self.parse_float()?);
            } else if self.maybe_match("emit") {
                material = material.with_emission(self.parse_color()?);
            } else {
                return Ok(material);
            }
        }
    }

    fn parse_positive(&mut self, what: &str) -> ParserResult<f64> {
        let position = self.peek_position();
        let value = self.parse_float()?;
        if value <= 0.0 {
            return self.error_at(format!("{} must be positive, got {}", what, value), position);
        }
        Ok(value)
    }

    fn parse_sphere(&mut self) -> ParserResult<SceneObject> {
        self.match_token("sphere")?;
        let center = self.parse_vec3()?;
        let radius = self.parse_positive("sphere radius")?;
        let material = self.parse_material()?;
        Ok(SceneObject::new(Solid::sphere(center, radius), material))
    }

    fn parse_box(&mut self) -> ParserResult<SceneObject> {
        let (_, position) = self.pop(); // discarding "box"
        let min = self.parse_vec3()?;
        let max = self.parse_vec3()?;
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return self.error_at("box minimum corner exceeds the maximum one".to_string(), position);
        }
        let material = self.parse_material()?;
        Ok(SceneObject::new(Solid::cube(min, max), material))
    }

    /// Main routine, parses the whole content. Settings missing from the file keep their default.
    pub fn parse_scene(&mut self) -> ParserResult<SceneDescription> {
        let mut settings = RenderSettings::default();
        let mut camera_position = Vec3::zero();
        let mut objects = Vec::new();

        while !self.is_empty() {
            let next_token = self.peek().to_string();
            match next_token.as_str() {
                "sphere" => objects.push(self.parse_sphere()?),
                "box" => objects.push(self.parse_box()?),
                "size" => {
                    self.pop();
                    settings.width = self.parse_unsigned()?;
                    settings.height = self.parse_unsigned()?;
                }
                "fov" => {
                    self.pop();
                    settings.fov = self.parse_float()?;
                }
                "depth" => {
                    self.pop();
                    let (token, position) = self.pop();
                    settings.max_depth = token.parse::<u32>().or_else(|_| {
                        self.error_at(format!("expected a depth, getting '{}'", token), position)
                    })?;
                }
                "bias" => {
                    self.pop();
                    settings.bias = self.parse_positive("bias")?;
                }
                "ior" => {
                    self.pop();
                    settings.ior = self.parse_positive("index of refraction")?;
                }
                "background" => {
                    self.pop();
                    settings.background = self.parse_color()?;
                }
                "camera" => {
                    self.pop();
                    camera_position = self.parse_vec3()?;
                }
                _ => {
                    let (token, position) = self.pop();
                    return self.error_at(format!("unexpected token '{}'", token), position);
                }
            }
        }

        Ok(SceneDescription {
            settings,
            camera_position,
            scene: Scene::new(objects),
        })
    }
}
