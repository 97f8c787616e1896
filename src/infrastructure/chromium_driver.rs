//! Chromium 页面驱动 - 基础设施层
//!
//! 唯一的 Page 持有者。所有原语都通过注入 JS 实现，
//! 避免依赖 CDP 的元素句柄在重渲染页面上失效。

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::infrastructure::page_driver::PageDriver;

/// 验证码图片的元素 id
const CAPTCHA_IMG_ID: &str = "capchaImg";

/// 场次单选框的 name 属性
const SHOW_RADIO_NAME: &str = "hope_event_perf_cd";
/// 席种单选框的 name 属性
const SEAT_RADIO_NAME: &str = "hope_stk_stknd_cd";

/// 把任意字符串安全地嵌入 JS 字面量
fn js_str(s: &str) -> String {
    JsonValue::String(s.to_string()).to_string()
}

pub struct ChromiumDriver {
    page: Page,
}

impl ChromiumDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 对单个元素执行一段 JS，元素不存在时报错
    async fn with_element(&self, selector: &str, body: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                {body}
                return true;
            }})()"#,
            sel = js_str(selector),
            body = body,
        );
        let found: bool = self.eval_as(js).await?;
        if !found {
            bail!("页面元素不存在: {}", selector);
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> Result<String> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.innerText : null;
            }})()"#,
            sel = js_str(selector),
        );
        let text: Option<String> = self.eval_as(js).await?;
        text.with_context(|| format!("页面元素不存在: {}", selector))
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.value : null;
            }})()"#,
            sel = js_str(selector),
        );
        let value: Option<String> = self.eval_as(js).await?;
        value.with_context(|| format!("页面元素不存在: {}", selector))
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        let js = format!(
            "document.querySelector({sel}) !== null",
            sel = js_str(selector),
        );
        self.eval_as(js).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.with_element(selector, "el.click();").await
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let body = format!(
            r#"el.value = {val};
               el.dispatchEvent(new Event('input', {{ bubbles: true }}));
               el.dispatchEvent(new Event('change', {{ bubbles: true }}));"#,
            val = js_str(value),
        );
        self.with_element(selector, &body).await
    }

    async fn check(&self, selector: &str) -> Result<()> {
        let body = r#"el.checked = true;
               el.dispatchEvent(new Event('change', { bubbles: true }));"#;
        self.with_element(selector, body).await
    }

    async fn select_value(&self, selector: &str, value: &str) -> Result<()> {
        let body = format!(
            r#"el.value = {val};
               el.dispatchEvent(new Event('change', {{ bubbles: true }}));"#,
            val = js_str(value),
        );
        self.with_element(selector, &body).await
    }

    async fn select_label(&self, selector: &str, label: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                for (let i = 0; i < el.options.length; i++) {{
                    if (el.options[i].text.trim() === {label}) {{
                        el.selectedIndex = i;
                        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return true;
                    }}
                }}
                return false;
            }})()"#,
            sel = js_str(selector),
            label = js_str(label),
        );
        let found: bool = self.eval_as(js).await?;
        if !found {
            bail!("下拉框 {} 中找不到选项: {}", selector, label);
        }
        Ok(())
    }

    async fn captcha_image_base64(&self) -> Result<String> {
        // 通过 canvas 重画取图片数据，绕过跨域图片的直接读取限制
        let js = format!(
            r#"(() => {{
                const img = document.getElementById({id});
                if (!img) return null;
                const canvas = document.createElement('canvas');
                canvas.width = img.clientWidth;
                canvas.height = img.clientHeight;
                const ctx = canvas.getContext('2d');
                ctx.drawImage(img, 0, 0);
                let dataURL = canvas.toDataURL('image/jpeg');
                return dataURL.replace(/^data:image\/(png|jpeg);base64,/, '');
            }})()"#,
            id = js_str(CAPTCHA_IMG_ID),
        );
        let data: Option<String> = self.eval_as(js).await?;
        data.context("验证码图片元素不存在")
    }

    async fn captcha_image_src(&self) -> Result<String> {
        let js = format!(
            r#"(() => {{
                const img = document.getElementById({id});
                return img ? img.src : null;
            }})()"#,
            id = js_str(CAPTCHA_IMG_ID),
        );
        let src: Option<String> = self.eval_as(js).await?;
        src.context("验证码图片元素不存在")
    }

    async fn page_summary(&self) -> Result<String> {
        // 抽取确认页上的 dt/dd 键值对，span 只是装饰，忽略
        let js = r#"(() => {
            function textIgnoringSpans(element) {
                let text = '';
                element.childNodes.forEach(node => {
                    if (node.nodeType === Node.TEXT_NODE) {
                        text += node.textContent.trim();
                    } else if (node.nodeType === Node.ELEMENT_NODE && node.tagName !== 'SPAN') {
                        text += textIgnoringSpans(node);
                    }
                });
                return text;
            }

            const dls1 = document.querySelectorAll('.vertical_table.white_back.line_bottom');
            const dls2 = document.querySelectorAll('.vertical_table.white_back.line_top');
            const dls = Array.from(dls1).concat(Array.from(dls2));
            let resultText = '';

            dls.forEach(dl => {
                let title = '';
                const content = [];
                const dt = dl.querySelector('dt');
                if (dt) title = textIgnoringSpans(dt);
                dl.querySelectorAll('dd').forEach(dd => {
                    const ddText = textIgnoringSpans(dd);
                    if (ddText) content.push(ddText);
                });
                if (title && content.length) {
                    resultText += title + ': ' + content.join(', ') + '\n';
                }
            });

            return resultText;
        })()"#;
        self.eval_as(js).await
    }

    async fn select_show(&self, show_no_one_based: usize) -> Result<()> {
        // 只按校验过的下标点击，绝不做任意 DOM 遍历
        let js = format!(
            r#"(() => {{
                const zeroBased = {n} - 1;
                const elements = document.getElementsByName({name});
                if (zeroBased < 0 || zeroBased >= elements.length) return false;
                elements[zeroBased].click();
                return true;
            }})()"#,
            n = show_no_one_based,
            name = js_str(SHOW_RADIO_NAME),
        );
        let clicked: bool = self.eval_as(js).await?;
        if !clicked {
            bail!("场次下标越界: {}", show_no_one_based);
        }
        Ok(())
    }

    async fn select_general_seat(&self) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const elements = document.getElementsByName({name});
                if (elements.length === 0) return false;
                elements[0].click();
                return true;
            }})()"#,
            name = js_str(SEAT_RADIO_NAME),
        );
        let clicked: bool = self.eval_as(js).await?;
        if !clicked {
            bail!("页面上没有席种单选框");
        }
        Ok(())
    }
}
